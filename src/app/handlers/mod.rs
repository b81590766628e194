pub mod page;
pub mod sample_resource;

pub use page::PageHandler;
pub use sample_resource::SampleResourceHandler;
