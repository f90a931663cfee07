//! Cache warming: pre-fetching derived image sizes with bounded concurrency

pub mod cancel;
pub mod scheduler;
pub mod service;
pub mod toucher;
pub mod warmer;

pub use cancel::{CancelHandle, CancelSignal};
pub use scheduler::WarmingScheduler;
pub use service::WarmingService;
pub use toucher::{HttpToucher, ImageToucher};
pub use warmer::{ImageWarmer, WarmReport};
