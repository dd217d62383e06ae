//! GraphQL documents sent to the subgraphs

pub const CLONES_QUERY: &str = r#"
query clonesQuery($first: Int = 1000, $skip: Int = 0) {
  clones(first: $first, skip: $skip) {
    id
    address
    data
  }
}
"#;

pub const KASHI_PAIRS_QUERY: &str = r#"
query kashiPairs($first: Int = 1000, $skip: Int = 0, $where: KashiPair_filter) {
  kashiPairs(first: $first, skip: $skip, orderBy: utilization, orderDirection: desc, where: $where) {
    id
    type
    owner
    feeTo
    name
    symbol
    oracle
    asset { id symbol name decimals }
    collateral { id symbol name decimals }
    exchangeRate
    totalAssetBase
    totalAssetElastic
    totalBorrowBase
    totalBorrowElastic
    interestPerSecond
    utilization
    feesEarnedFraction
    totalFeesEarnedFraction
    lastAccrued
    supplyAPR
    borrowAPR
  }
}
"#;

pub const BENTOBOX_QUERY: &str = r#"
query bentoBoxQuery($id: String = "0xf5bce5077908a1b7370b9ae04adc565ebd643966") {
  bentoBoxes(first: 1, where: { id: $id }) {
    id
    totalUsers
    totalTokens
    totalKashiPairs
    totalStrategies
    tokens(first: 1000) { id symbol name decimals totalSupplyBase totalSupplyElastic }
  }
}
"#;

pub const BENTO_STRATEGIES_QUERY: &str = r#"
query bentoStrategies($first: Int = 1000, $skip: Int = 0, $where: Token_filter) {
  tokens(first: $first, skip: $skip, where: $where) {
    id
    strategy {
      token
      apy
      targetPercentage
      utilization
    }
  }
}
"#;

pub const BENTO_TOKENS_QUERY: &str = r#"
query bentoTokens($first: Int = 1000, $skip: Int = 0, $where: Token_filter) {
  tokens(first: $first, skip: $skip, where: $where) {
    id
    name
    symbol
    decimals
    totalSupplyBase
    totalSupplyElastic
  }
}
"#;

pub const BENTO_USER_TOKENS_QUERY: &str = r#"
query bentoUserTokens($user: String!, $skip: Int = 0, $first: Int = 1000) {
  userTokens(skip: $skip, first: $first, where: { share_gt: 0, user: $user }) {
    token { id name symbol decimals totalSupplyBase totalSupplyElastic }
    share
  }
}
"#;

pub const BLOCK_QUERY: &str = r#"
query blockQuery($where: Block_filter) {
  blocks(first: 1, orderBy: timestamp, orderDirection: desc, where: $where) {
    id
    number
    timestamp
  }
}
"#;

pub const BLOCKS_QUERY: &str = r#"
query blocksQuery($first: Int = 1000, $skip: Int = 0, $start: Int, $end: Int) {
  blocks(first: $first, skip: $skip, orderBy: number, orderDirection: desc, where: { timestamp_gt: $start, timestamp_lt: $end }) {
    id
    number
    timestamp
  }
}
"#;

pub const MISO_COMMITMENTS_QUERY: &str = r#"
query misoCommitmentsQuery($auctionId: String, $first: Int = 1000, $skip: Int = 0) {
  commitments(first: $first, skip: $skip, where: { auction: $auctionId }, orderBy: timestamp, orderDirection: desc) {
    id
    user { id }
    amount
    transactionHash
    block
    timestamp
  }
}
"#;

/// One aliased sub-query per timestamp, matching the block inside
/// `[timestamp, timestamp + 600s]`
pub fn mass_blocks_query(timestamps: &[u64]) -> String {
    let body: Vec<String> = timestamps
        .iter()
        .map(|ts| {
            format!(
                "  t{ts}: blocks(first: 1, orderBy: timestamp, orderDirection: desc, where: {{ timestamp_gt: {ts}, timestamp_lt: {end} }}) {{ number }}",
                ts = ts,
                end = ts + 600
            )
        })
        .collect();
    format!("query blocks {{\n{}\n}}", body.join("\n"))
}
