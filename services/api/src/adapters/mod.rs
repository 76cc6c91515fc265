pub mod db;
pub mod memory;
pub mod sales_page_llm;

pub use db::DbAdapter;
pub use memory::InMemoryRepository;
pub use sales_page_llm::OpenAiSalesPageAdapter;
