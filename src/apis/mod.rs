pub mod hierarchy;

// Re-export all APIs
pub use hierarchy::HierarchyApi;
