//! Warning shown before trading tokens that are not on any list

use crate::tokens::Token;

#[derive(Debug, Clone, Default)]
pub struct TokenWarning {
    tokens: Vec<Token>,
    open: bool,
}

impl TokenWarning {
    /// Opens as soon as there is anything to warn about
    pub fn new(tokens: Vec<Token>) -> Self {
        let open = !tokens.is_empty();
        Self { tokens, open }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Dismissing counts as confirming the import
    pub fn confirm(&mut self) {
        self.open = false;
    }

    /// One line per token: symbol, name and address
    pub fn lines(&self) -> Vec<String> {
        self.tokens
            .iter()
            .map(|t| format!("{} ({}) {}", t.symbol, t.name, t.address))
            .collect()
    }
}
