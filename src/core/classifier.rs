//! Token account layout classification.
//!
//! Base layouts are recognised by size alone. Accounts owned by the
//! extension-capable program can be larger than the base holding layout, and
//! for those a [`LayoutHeuristic`] decides between mint and holding.

use tracing::{debug, warn};

use crate::config::{EnrichConfig, HeuristicKind};
use crate::core::binary_reader::{BinaryReader, BinaryReaderError};
use crate::core::constants::layout::{
    ACCOUNT_TYPE_ACCOUNT, ACCOUNT_TYPE_MINT, ACCOUNT_TYPE_OFFSET, HOLDING_AMOUNT_OFFSET,
    HOLDING_MINT_OFFSET, MINT_LEN, TOKEN_ACCOUNT_LEN,
};
use crate::core::error::AmbiguousLayout;
use crate::types::{AccountBlob, ClassifiedAccount};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutKind {
    Holding,
    Mint,
}

/// A heuristic pick that could be wrong.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutGuess {
    pub kind: LayoutKind,
    pub reason: String,
}

/// Tells mint from holding for extended accounts (longer than the base
/// holding layout). `Err` carries a best guess.
pub trait LayoutHeuristic: Send + Sync {
    fn disambiguate(&self, data: &[u8]) -> Result<LayoutKind, LayoutGuess>;
}

/// Reads the first four bytes as a little-endian u32. A mint starts with the
/// option tag of its mint authority, which is 0 or 1; a holding starts with a
/// mint address, which can collide with that tag.
#[derive(Clone, Copy, Debug, Default)]
pub struct AuthorityDiscriminant;

impl LayoutHeuristic for AuthorityDiscriminant {
    fn disambiguate(&self, data: &[u8]) -> Result<LayoutKind, LayoutGuess> {
        let opt = match BinaryReader::new(data).read_u32() {
            Ok(opt) => opt,
            Err(err) => {
                return Err(LayoutGuess {
                    kind: LayoutKind::Holding,
                    reason: err.to_string(),
                })
            }
        };
        // u32 LE in {0, 1} pins bytes 1..4 to zero.
        if matches!(opt, 0 | 1) {
            Err(LayoutGuess {
                kind: LayoutKind::Mint,
                reason: format!(
                    "leading bytes {} read as authority option tag",
                    hex::encode(&data[..4])
                ),
            })
        } else {
            Ok(LayoutKind::Holding)
        }
    }
}

/// Reads the account-type byte that follows the base holding layout in
/// extended accounts, falling back to [`AuthorityDiscriminant`] when it is
/// missing or unknown.
#[derive(Clone, Copy, Debug, Default)]
pub struct AccountTypeMarker;

impl LayoutHeuristic for AccountTypeMarker {
    fn disambiguate(&self, data: &[u8]) -> Result<LayoutKind, LayoutGuess> {
        let marker = BinaryReader::at(data, ACCOUNT_TYPE_OFFSET).and_then(|mut r| r.read_u8());
        match marker {
            Ok(ACCOUNT_TYPE_MINT) => Ok(LayoutKind::Mint),
            Ok(ACCOUNT_TYPE_ACCOUNT) => Ok(LayoutKind::Holding),
            Ok(other) => AuthorityDiscriminant.disambiguate(data).map_err(|guess| LayoutGuess {
                reason: format!("unknown account type {other}; {}", guess.reason),
                ..guess
            }),
            Err(_) => AuthorityDiscriminant.disambiguate(data),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OwnerVariant {
    Fixed,
    Extended,
}

pub struct AccountClassifier {
    token_program: String,
    token_2022_program: String,
    heuristic: Box<dyn LayoutHeuristic>,
}

impl AccountClassifier {
    pub fn new(config: &EnrichConfig) -> Self {
        let heuristic: Box<dyn LayoutHeuristic> = match config.layout_heuristic {
            HeuristicKind::AuthorityDiscriminant => Box::new(AuthorityDiscriminant),
            HeuristicKind::AccountTypeMarker => Box::new(AccountTypeMarker),
        };
        Self {
            token_program: config.token_program_id.clone(),
            token_2022_program: config.token_2022_program_id.clone(),
            heuristic,
        }
    }

    pub fn with_heuristic(mut self, heuristic: impl LayoutHeuristic + 'static) -> Self {
        self.heuristic = Box::new(heuristic);
        self
    }

    fn owner_variant(&self, owner: &str) -> Option<OwnerVariant> {
        if owner == self.token_program {
            Some(OwnerVariant::Fixed)
        } else if owner == self.token_2022_program {
            Some(OwnerVariant::Extended)
        } else {
            None
        }
    }

    /// Classify `data` stored at `address` and owned by `owner`.
    ///
    /// `Err` means the layout heuristic had to guess; the guess is inside.
    pub fn classify(
        &self,
        address: &str,
        owner: &str,
        data: &[u8],
    ) -> Result<ClassifiedAccount, AmbiguousLayout> {
        let Some(variant) = self.owner_variant(owner) else {
            return Ok(ClassifiedAccount::Unclassified);
        };
        let mint_record = || ClassifiedAccount::MintRecord {
            address: address.to_string(),
        };

        match (variant, data.len()) {
            (_, TOKEN_ACCOUNT_LEN) => Ok(decode_holding(address, data)),
            (_, MINT_LEN) => Ok(mint_record()),
            (OwnerVariant::Extended, len) if len > MINT_LEN && len < TOKEN_ACCOUNT_LEN => {
                Ok(mint_record())
            }
            (OwnerVariant::Extended, len) if len > TOKEN_ACCOUNT_LEN => {
                match self.heuristic.disambiguate(data) {
                    Ok(LayoutKind::Holding) => Ok(decode_holding(address, data)),
                    Ok(LayoutKind::Mint) => Ok(mint_record()),
                    Err(guess) => Err(AmbiguousLayout {
                        owner: owner.to_string(),
                        len,
                        reason: guess.reason,
                        guess: match guess.kind {
                            LayoutKind::Holding => decode_holding(address, data),
                            LayoutKind::Mint => mint_record(),
                        },
                    }),
                }
            }
            _ => Ok(ClassifiedAccount::Unclassified),
        }
    }

    /// Decode and classify a resolved blob, logging instead of failing:
    /// undecodable data is `Unclassified`, ambiguous layouts use the guess.
    pub fn classify_blob(&self, address: &str, blob: &AccountBlob) -> ClassifiedAccount {
        let data = match blob.data.decode() {
            Ok(data) => data,
            Err(err) => {
                warn!(%address, "skipping account with undecodable data: {err}");
                return ClassifiedAccount::Unclassified;
            }
        };
        match self.classify(address, &blob.owner, &data) {
            Ok(classified) => classified,
            Err(ambiguous) => {
                debug!(%address, "{ambiguous}");
                ambiguous.into_guess()
            }
        }
    }
}

fn decode_holding(address: &str, data: &[u8]) -> ClassifiedAccount {
    match read_holding(data) {
        Ok(holding) => holding,
        Err(err) => {
            warn!(%address, "holding layout could not be read: {err}");
            ClassifiedAccount::Unclassified
        }
    }
}

fn read_holding(data: &[u8]) -> Result<ClassifiedAccount, BinaryReaderError> {
    let mint = BinaryReader::at(data, HOLDING_MINT_OFFSET)?.read_pubkey()?;
    let raw_amount = BinaryReader::at(data, HOLDING_AMOUNT_OFFSET)?.read_u64()?;
    Ok(ClassifiedAccount::TokenHolding {
        mint,
        raw_amount: u128::from(raw_amount),
    })
}
