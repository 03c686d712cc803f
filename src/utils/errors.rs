use thiserror::Error;

/// Errors raised by the transfer wizard
#[derive(Debug, Error, PartialEq)]
pub enum WizardError {
    #[error("No transfer in progress: the session must be used within a transfer session. Start one with `$transfer`")]
    NoSession,
    #[error("Please enter a recipient")]
    MissingRecipient,
    #[error("Amount must be at least 0.01")]
    AmountTooSmall,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Auto-refund timeout must be at least 1")]
    TimeoutTooShort,
    #[error("Please enter a password for the recipient")]
    MissingPassword,
    #[error("`{action}` is not available on step {step}")]
    WrongStep { action: &'static str, step: u8 },
    #[error("This transfer is already being submitted")]
    SubmissionPending,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Errors raised while building or operating streams
#[derive(Debug, Error, PartialEq)]
pub enum StreamError {
    #[error("Stream '{0}' not found")]
    NotFound(String),
    #[error("Milestone '{0}' not found")]
    MilestoneNotFound(String),
    #[error("Milestone percentage must be between 1 and 99")]
    PercentageOutOfRange,
    #[error("Milestone description cannot be empty")]
    EmptyDescription,
    #[error("Milestone {percentage}% has not been reached yet ({reached:.1}% streamed)")]
    MilestoneNotReached { percentage: u8, reached: f64 },
    #[error("Please enter a recipient")]
    MissingRecipient,
    #[error("Amount must be at least 0.01")]
    AmountTooSmall,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Duration must be at least 1")]
    ZeroDuration,
}

/// Errors raised by the claim desk
#[derive(Debug, Error, PartialEq)]
pub enum ClaimError {
    #[error("The specified claim could not be found")]
    NotFound,
    #[error("Incorrect password")]
    IncorrectPassword,
    #[error("Could not parse the QR code data")]
    InvalidQrCode,
    #[error("This QR code doesn't contain payment information")]
    NotAPaymentCode,
    #[error("A password check is already running")]
    VerificationPending,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Errors raised by the testnet faucet
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FaucetError {
    #[error("Unknown faucet token: {0}")]
    UnknownToken(String),
    #[error("You already claimed {symbol} recently. Try again in {remaining}")]
    CoolingDown { symbol: String, remaining: String },
    #[error("A faucet claim is already in progress")]
    AlreadyClaiming,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Errors raised by username registration
#[derive(Debug, Error, PartialEq)]
pub enum RegistrationError {
    #[error("Username must be at least 3 characters")]
    TooShort,
    #[error("Only lowercase letters, numbers and underscores are allowed")]
    InvalidCharacters,
    #[error("Username @{0}.sei is unavailable. Please choose another username")]
    Unavailable(String),
    #[error("You are already registered as {0}")]
    AlreadyRegistered(String),
    #[error("No registration in progress. Start with `$register <username>`")]
    NotStarted,
    #[error("`{action}` is not available on step {step}")]
    WrongStep { action: &'static str, step: u8 },
    #[error("A registration request is already running")]
    Busy,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Errors surfaced by the payment gateway
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    #[error("Gateway rejected the request: {0}")]
    Rejected(String),
    #[error("Gateway unavailable: {0}")]
    Unavailable(String),
}
