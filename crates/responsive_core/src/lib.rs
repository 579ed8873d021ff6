pub mod contrast;
pub mod css;
pub mod domain;
pub mod ports;
pub mod progress;
pub mod prompt;
pub mod resources;
pub mod scanner;
pub mod snapshot;
pub mod stylesheet;

pub use domain::{
    Achievement, CssFix, CssRule, DesignIssue, Device, DeviceInfo, DeviceType, Finding, FixSet,
    Impact, IssueCategory, MediaQuery, NewDevice, ScreenSize, UserProgress,
};
pub use ports::{
    CompletionService, DeviceCatalog, ErrorKind, FetchedPage, PageFetcher, PageRenderer, PortError,
    PortResult, ProgressStore, WordPressGateway,
};
pub use scanner::{scan, PageSnapshot};
