//! Menu derivation and memoization

use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, trace};

use super::{Icon, Menu, MenuItem, MenuLeaf, MenuNode};
use crate::chain::ChainId;
use crate::context::WalletContext;
use crate::features::{Feature, FeatureTable};
use crate::i18n::Catalog;
use crate::tokens::sushi_address;

/// Derive the navigation menu. No chain means no navigation at all.
///
/// Sections are appended in a fixed order, each behind its own feature guard:
/// legacy, trident, farm, kashi, miso, explore, analytics, portfolio.
pub fn build_menu(
    chain_id: Option<ChainId>,
    account: Option<&str>,
    features: &FeatureTable,
    catalog: &Catalog,
) -> Menu {
    let Some(chain_id) = chain_id else {
        return Vec::new();
    };

    let enabled = |feature: Feature| features.is_enabled(feature, Some(chain_id));
    let t = |message: &str| catalog.translate(message);

    let mut menu: Menu = Vec::new();

    // Legacy, filtered by per-leaf guards
    let add_link = match sushi_address(chain_id) {
        Some(sushi) => format!("/add/ETH/{}", sushi),
        None => "/add/ETH".to_string(),
    };
    let legacy_items: Vec<MenuLeaf> = [
        (MenuLeaf::new("swap", t("Swap"), "/swap"), true),
        (MenuLeaf::new("limit", t("Limit order"), "/limit-order"), enabled(Feature::LimitOrders)),
        (MenuLeaf::new("pool", t("Pool"), "/pool"), true),
        (MenuLeaf::new("add-liquidity", t("Add"), add_link), true),
        (MenuLeaf::new("migrate", t("Migrate"), "/migrate"), enabled(Feature::Migrate)),
        (MenuLeaf::new("import", t("Import"), "/find"), true),
    ]
    .into_iter()
    .filter_map(|(leaf, visible)| visible.then_some(leaf))
    .collect();
    menu.push(MenuNode::new("legacy", t("Legacy"), Icon::SwitchVertical, legacy_items).into());

    if enabled(Feature::Trident) {
        menu.push(
            MenuNode::new(
                "trident",
                t("Trident"),
                Icon::SwitchVertical,
                vec![
                    MenuLeaf::new("trident-swap", t("Swap"), "/trident/swap"),
                    MenuLeaf::new("trident-pools", t("Pools"), "/trident/pools"),
                    MenuLeaf::new("trident-create", t("Create"), "/trident/create"),
                    MenuLeaf::new("trident-migrate", t("Migrate"), "/trident/migrate"),
                ],
            )
            .into(),
        );
    }

    if enabled(Feature::LiquidityMining) {
        menu.push(
            MenuNode::new(
                "farm",
                t("Farm"),
                Icon::SwitchVerticalRotated,
                vec![
                    MenuLeaf::new("farm", t("Onsen Menu"), "/farm"),
                    MenuLeaf::new("my-farms", t("My Farms"), "/farm?filter=portfolio"),
                ],
            )
            .into(),
        );
    }

    if enabled(Feature::Kashi) {
        menu.push(
            MenuNode::new(
                "kashi",
                t("Kashi"),
                Icon::SwitchVerticalRotated,
                vec![
                    MenuLeaf::new("lend", t("Lend"), "/kashi?view=lend"),
                    MenuLeaf::new("borrow", t("Borrow"), "/kashi?view=borrow"),
                ],
            )
            .into(),
        );
    }

    if enabled(Feature::Miso) {
        let mut items = vec![MenuLeaf::new("marketplace", t("Marketplace"), "/miso")];
        // Launchpad is not offered on mainnet
        if chain_id != ChainId::ETHEREUM {
            items.push(MenuLeaf::new("launchpad", t("Launchpad"), "/miso/auction"));
        }
        menu.push(MenuNode::new("miso", t("MISO"), Icon::Rocket, items).into());
    }

    let mut explore = Vec::new();
    if enabled(Feature::Staking) {
        explore.push(MenuLeaf::new("sushi-bar", t("Sushi Bar"), "/stake"));
    }
    if enabled(Feature::Meowshi) {
        explore.push(MenuLeaf::new("meowshi", t("Meowshi"), "/tools/meowshi"));
    }
    // Also behind the Meowshi flag
    if enabled(Feature::Meowshi) {
        explore.push(MenuLeaf::new("yield", t("Yield Strategies"), "/tools/inari"));
    }
    if !explore.is_empty() {
        menu.push(MenuNode::new("explore", t("Explore"), Icon::Globe, explore).into());
    }

    if enabled(Feature::Analytics) {
        let mut items = vec![
            MenuLeaf::new("dashboard", "Dashboard", format!("/analytics/{}/dashboard", chain_id)),
            MenuLeaf::new("xsushi", "xSUSHI", "/analytics/xsushi"),
            MenuLeaf::new("tokens", "Tokens", format!("/analytics/{}/tokens", chain_id)),
            MenuLeaf::new("pairs", "Pairs", format!("/analytics/{}/pairs", chain_id)),
        ];
        if enabled(Feature::Bentobox) {
            items.push(MenuLeaf::new("farms", "Farms", format!("/analytics/{}/farms", chain_id)));
            items.push(MenuLeaf::new(
                "bentobox",
                "Bentobox",
                format!("/analytics/{}/bentobox", chain_id),
            ));
        }
        menu.push(MenuNode::new("analytics", t("Analytics"), Icon::TrendingUp, items).into());
    }

    if let Some(account) = account.filter(|a| !a.is_empty()) {
        menu.push(
            MenuLeaf::new("portfolio", t("Portfolio"), format!("/account/{}", account))
                .with_icon(Icon::Wallet)
                .into(),
        );
    }

    menu.retain(|item: &MenuItem| !item.is_empty());
    menu
}

// ============================================
// MEMOIZED BUILDER
// ============================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct MenuDeps {
    account: Option<String>,
    chain_id: Option<ChainId>,
    locale: String,
}

/// Recomputes the menu only when (account, chain, locale) changes or a new
/// catalog is installed. Unchanged inputs return the very same `Arc`.
pub struct MenuBuilder {
    features: Arc<FeatureTable>,
    catalog: RwLock<Arc<Catalog>>,
    last: Mutex<Option<(MenuDeps, Arc<Catalog>, Arc<Menu>)>>,
}

impl MenuBuilder {
    pub fn new(features: Arc<FeatureTable>, catalog: Catalog) -> Self {
        Self {
            features,
            catalog: RwLock::new(Arc::new(catalog)),
            last: Mutex::new(None),
        }
    }

    /// Install a catalog; the next call always recomputes
    pub fn set_catalog(&self, catalog: Catalog) {
        let mut current = self.catalog.write().unwrap_or_else(|e| e.into_inner());
        *current = Arc::new(catalog);
    }

    pub fn features(&self) -> &FeatureTable {
        &self.features
    }

    /// Menu for a wallet snapshot
    pub fn menu(&self, context: &WalletContext) -> Arc<Menu> {
        self.menu_for(context.chain_id, context.account())
    }

    pub fn menu_for(&self, chain_id: Option<ChainId>, account: Option<&str>) -> Arc<Menu> {
        let catalog = self.catalog.read().unwrap_or_else(|e| e.into_inner()).clone();
        let deps = MenuDeps {
            account: account.map(String::from),
            chain_id,
            locale: catalog.locale().to_string(),
        };

        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((cached_deps, cached_catalog, menu)) = last.as_ref() {
            if *cached_deps == deps && Arc::ptr_eq(cached_catalog, &catalog) {
                trace!("Menu unchanged for {:?}", deps);
                return menu.clone();
            }
        }

        let menu = Arc::new(build_menu(chain_id, account, &self.features, &catalog));
        debug!(
            "Menu rebuilt: chain={:?} locale={} sections={}",
            chain_id,
            deps.locale,
            menu.len()
        );
        *last = Some((deps, catalog, menu.clone()));
        menu
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(menu: &Menu) -> Vec<&str> {
        menu.iter().map(|item| item.key()).collect()
    }

    fn item<'a>(menu: &'a Menu, key: &str) -> &'a MenuItem {
        menu.iter().find(|i| i.key() == key).unwrap()
    }

    fn item_keys<'a>(menu: &'a Menu, key: &str) -> Vec<&'a str> {
        item(menu, key).items().iter().map(|l| l.key.as_str()).collect()
    }

    #[test]
    fn test_no_chain_no_menu() {
        let table = FeatureTable::builtin();
        let catalog = Catalog::english();
        assert!(build_menu(None, None, &table, &catalog).is_empty());
        assert!(build_menu(None, Some("0xABC"), &table, &catalog).is_empty());
    }

    #[test]
    fn test_kashi_and_analytics_only() {
        let table = FeatureTable::empty()
            .with(ChainId::ETHEREUM, &[Feature::Kashi, Feature::Analytics]);
        let menu = build_menu(Some(ChainId::ETHEREUM), None, &table, &Catalog::english());

        assert_eq!(keys(&menu), vec!["legacy", "kashi", "analytics"]);
        assert_eq!(item_keys(&menu, "analytics"), vec!["dashboard", "xsushi", "tokens", "pairs"]);
        assert_eq!(item_keys(&menu, "kashi"), vec!["lend", "borrow"]);
        // Limit orders and migrate are guarded off
        assert_eq!(
            item_keys(&menu, "legacy"),
            vec!["swap", "pool", "add-liquidity", "import"]
        );
    }

    #[test]
    fn test_miso_on_mainnet_has_no_launchpad() {
        let table = FeatureTable::empty().with(ChainId::ETHEREUM, &[Feature::Miso]);
        let menu = build_menu(Some(ChainId::ETHEREUM), Some("0xABC"), &table, &Catalog::english());

        assert_eq!(item_keys(&menu, "miso"), vec!["marketplace"]);
        match item(&menu, "portfolio") {
            MenuItem::Leaf(leaf) => {
                assert_eq!(leaf.link, "/account/0xABC");
                assert_eq!(leaf.icon, Some(Icon::Wallet));
            }
            MenuItem::Node(_) => panic!("portfolio must be a leaf"),
        }
        assert_eq!(menu.last().map(|i| i.key()), Some("portfolio"));
    }

    #[test]
    fn test_miso_off_mainnet_has_launchpad() {
        let table = FeatureTable::empty().with(ChainId::HARMONY, &[Feature::Miso]);
        let menu = build_menu(Some(ChainId::HARMONY), None, &table, &Catalog::english());
        assert_eq!(item_keys(&menu, "miso"), vec!["marketplace", "launchpad"]);
    }

    #[test]
    fn test_full_section_order() {
        let table = FeatureTable::empty().with(ChainId::KOVAN, &Feature::ALL);
        let menu = build_menu(Some(ChainId::KOVAN), Some("0x1"), &table, &Catalog::english());

        assert_eq!(
            keys(&menu),
            vec!["legacy", "trident", "farm", "kashi", "miso", "explore", "analytics", "portfolio"]
        );
        assert_eq!(item_keys(&menu, "explore"), vec!["sushi-bar", "meowshi", "yield"]);
        assert_eq!(
            item_keys(&menu, "analytics"),
            vec!["dashboard", "xsushi", "tokens", "pairs", "farms", "bentobox"]
        );
        assert_eq!(
            item_keys(&menu, "legacy"),
            vec!["swap", "limit", "pool", "add-liquidity", "migrate", "import"]
        );
    }

    #[test]
    fn test_explore_follows_single_meowshi_flag() {
        let table = FeatureTable::empty().with(ChainId::ETHEREUM, &[Feature::Meowshi]);
        let menu = build_menu(Some(ChainId::ETHEREUM), None, &table, &Catalog::english());
        assert_eq!(item_keys(&menu, "explore"), vec!["meowshi", "yield"]);

        // Inari alone does not bring the yield leaf
        let table = FeatureTable::empty().with(ChainId::ETHEREUM, &[Feature::Inari]);
        let menu = build_menu(Some(ChainId::ETHEREUM), None, &table, &Catalog::english());
        assert!(!keys(&menu).contains(&"explore"));
    }

    #[test]
    fn test_portfolio_embeds_account() {
        let table = FeatureTable::builtin();
        for chain_id in table.chains() {
            if !table.is_enabled(Feature::Analytics, Some(chain_id)) {
                continue;
            }
            let menu = build_menu(Some(chain_id), Some("0xdeadbeef"), &table, &Catalog::english());
            match item(&menu, "portfolio") {
                MenuItem::Leaf(leaf) => assert_eq!(leaf.link, "/account/0xdeadbeef"),
                MenuItem::Node(_) => panic!("portfolio must be a leaf"),
            }
        }
    }

    #[test]
    fn test_empty_account_is_absent() {
        let table = FeatureTable::builtin();
        let menu = build_menu(Some(ChainId::ETHEREUM), Some(""), &table, &Catalog::english());
        assert!(!keys(&menu).contains(&"portfolio"));
    }

    #[test]
    fn test_add_link_uses_sushi() {
        let table = FeatureTable::empty();
        let menu = build_menu(Some(ChainId::ETHEREUM), None, &table, &Catalog::english());
        let add = &item(&menu, "legacy").items()[2];
        assert_eq!(add.key, "add-liquidity");
        assert!(add.link.starts_with("/add/ETH/0x"));

        let menu = build_menu(Some(ChainId::NERVOS_TESTNET), None, &table, &Catalog::english());
        assert_eq!(item(&menu, "legacy").items()[2].link, "/add/ETH");
    }

    #[test]
    fn test_unique_sibling_keys() {
        let table = FeatureTable::empty().with(ChainId::POLYGON, &Feature::ALL);
        let menu = build_menu(Some(ChainId::POLYGON), Some("0x1"), &table, &Catalog::english());

        let mut top = keys(&menu);
        top.sort();
        top.dedup();
        assert_eq!(top.len(), menu.len());

        for entry in &menu {
            let mut children: Vec<_> = entry.items().iter().map(|l| &l.key).collect();
            let count = children.len();
            children.sort();
            children.dedup();
            assert_eq!(children.len(), count);
        }
    }

    #[test]
    fn test_titles_are_translated() {
        let mut catalog = Catalog::english();
        catalog.locale = "fr".to_string();
        catalog.messages.insert("Swap".to_string(), "Échanger".to_string());

        let menu = build_menu(Some(ChainId::ETHEREUM), None, &FeatureTable::empty(), &catalog);
        assert_eq!(item(&menu, "legacy").items()[0].title, "Échanger");
    }

    #[test]
    fn test_memoized_menu_is_referentially_stable() {
        let builder = MenuBuilder::new(Arc::new(FeatureTable::builtin()), Catalog::english());
        let context = WalletContext::new(Some(ChainId::ETHEREUM), Some("0xABC".to_string()));

        let first = builder.menu(&context);
        let second = builder.menu(&context.clone());
        assert!(Arc::ptr_eq(&first, &second));

        let other = builder.menu(&WalletContext::new(Some(ChainId::POLYGON), None));
        assert!(!Arc::ptr_eq(&first, &other));

        // Same inputs again rebuild an equal, but new, menu
        let third = builder.menu(&context);
        assert_eq!(*first, *third);
    }

    #[test]
    fn test_locale_change_recomputes() {
        let builder = MenuBuilder::new(Arc::new(FeatureTable::builtin()), Catalog::english());
        let context = WalletContext::new(Some(ChainId::ETHEREUM), None);
        let english = builder.menu(&context);

        let mut catalog = Catalog::english();
        catalog.locale = "fr".to_string();
        builder.set_catalog(catalog);

        let french = builder.menu(&context);
        assert!(!Arc::ptr_eq(&english, &french));
        assert!(Arc::ptr_eq(&french, &builder.menu(&context)));
    }

    #[test]
    fn test_catalog_reload_in_same_locale_recomputes() {
        let builder = MenuBuilder::new(Arc::new(FeatureTable::builtin()), Catalog::english());
        let context = WalletContext::new(Some(ChainId::ETHEREUM), None);
        let before = builder.menu(&context);
        assert_eq!(item(&before, "legacy").items()[0].title, "Swap");

        let mut catalog = Catalog::english();
        catalog.messages.insert("Swap".to_string(), "SWAP!".to_string());
        builder.set_catalog(catalog);

        let after = builder.menu(&context);
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(item(&after, "legacy").items()[0].title, "SWAP!");
        assert!(Arc::ptr_eq(&after, &builder.menu(&context)));
    }
}
