pub mod completion_llm;
pub mod device_store;
pub mod page_fetcher;
pub mod progress_store;
pub mod static_renderer;
pub mod wordpress;

pub use completion_llm::OpenAiCompletionAdapter;
pub use device_store::InMemoryDeviceCatalog;
pub use page_fetcher::ReqwestPageFetcher;
pub use progress_store::InMemoryProgressStore;
pub use static_renderer::StaticHtmlRenderer;
pub use wordpress::ReqwestWordPressGateway;
