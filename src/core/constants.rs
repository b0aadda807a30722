use spl_token::solana_program::program_pack::Pack;

pub const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
pub const TOKEN_2022_PROGRAM: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_ICON_BASE_URL: &str = "/static/token-icons";

/// Base-58 alphabet (no `0`, `O`, `I`, `l`), 32 to 44 characters.
pub const BASE58_ADDRESS_PATTERN: &str = "[1-9A-HJ-NP-Za-km-z]{32,44}";

pub const UNKNOWN_SYMBOL: &str = "Unknown";

pub mod layout {
    use super::Pack;

    /// Size of a base token holding account.
    pub const TOKEN_ACCOUNT_LEN: usize = <spl_token::state::Account as Pack>::LEN;
    /// Size of a base mint account.
    pub const MINT_LEN: usize = <spl_token::state::Mint as Pack>::LEN;

    pub const HOLDING_MINT_OFFSET: usize = 0;
    pub const HOLDING_AMOUNT_OFFSET: usize = 64;

    /// Extended accounts carry an account-type byte right after the base
    /// holding layout; mints are padded up to it.
    pub const ACCOUNT_TYPE_OFFSET: usize = TOKEN_ACCOUNT_LEN;
    pub const ACCOUNT_TYPE_MINT: u8 = 1;
    pub const ACCOUNT_TYPE_ACCOUNT: u8 = 2;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_sizes_match_the_token_program() {
        assert_eq!(layout::TOKEN_ACCOUNT_LEN, 165);
        assert_eq!(layout::MINT_LEN, 82);
        assert_eq!(spl_token::id().to_string(), TOKEN_PROGRAM);
    }
}
