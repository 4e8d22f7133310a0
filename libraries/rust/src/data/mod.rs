#[cfg(feature = "data")]
pub mod client;
pub mod payload;
pub use client::Client;
pub use client::Error;
pub use client::Interface;
pub use client::MockInterface;
pub use client::DEFAULT_BASE_URL;
pub use payload::Classified;
pub use payload::DailyClose;
pub use payload::LiveQuote;
