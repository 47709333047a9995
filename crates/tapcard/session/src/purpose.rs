//! Why a card session is opened

use derive_more::Display;

/// Display data identifying one card to the user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{label}")]
pub struct CardDescriptor {
    /// User-given card label
    pub label: String,
}

impl CardDescriptor {
    /// Describe a card by its label
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

/// Reason a session holds the radio; only affects the prompt
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Purpose {
    /// Reading the card to find out which wallet it holds
    #[display("identifying card")]
    IdentifyingCard,
    /// Writing a mnemonic to a blank card
    #[display("configuring card mnemonic")]
    ConfiguringCardMnemonic,
    /// Checking the card PIN
    #[display("verifying PIN of {card}")]
    VerifyingPin {
        /// Card being unlocked
        card: CardDescriptor,
    },
    /// Setting a new PIN
    #[display("restoring PIN of {card}")]
    RestoringPin {
        /// Card being reconfigured
        card: CardDescriptor,
    },
    /// Signing a transaction
    #[display("signing {label} with {card}")]
    SigningTransaction {
        /// Signing card
        card: CardDescriptor,
        /// What is being signed
        label: String,
    },
    /// Signing an ownership proof
    #[display("proving ownership of {card}")]
    ProvingOwnership {
        /// Signing card
        card: CardDescriptor,
    },
    /// Deriving public keys
    #[display("deriving public keys from {card}")]
    DerivingPublicKeys {
        /// Deriving card
        card: CardDescriptor,
    },
}

impl Purpose {
    /// The prompt shown while the radio is polling
    pub fn prompt(&self) -> String {
        match self {
            Self::IdentifyingCard => "Hold your card to the back of the phone".to_owned(),
            Self::ConfiguringCardMnemonic => {
                "Hold your card to the phone to configure it with your seed phrase".to_owned()
            }
            Self::VerifyingPin { card } => format!("Hold {card} to the phone to verify its PIN"),
            Self::RestoringPin { card } => format!("Hold {card} to the phone to set a new PIN"),
            Self::SigningTransaction { card, label } => {
                format!("Hold {card} to the phone to sign {label}")
            }
            Self::ProvingOwnership { card } => {
                format!("Hold {card} to the phone to prove ownership")
            }
            Self::DerivingPublicKeys { card } => {
                format!("Hold {card} to the phone to derive public keys")
            }
        }
    }

    /// The card this purpose concerns, if it names one
    pub const fn card(&self) -> Option<&CardDescriptor> {
        match self {
            Self::IdentifyingCard | Self::ConfiguringCardMnemonic => None,
            Self::VerifyingPin { card }
            | Self::RestoringPin { card }
            | Self::SigningTransaction { card, .. }
            | Self::ProvingOwnership { card }
            | Self::DerivingPublicKeys { card } => Some(card),
        }
    }
}
