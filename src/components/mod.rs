// Export components
pub mod google_calendar;

// Re-export the event cache handle
pub use google_calendar::EventCacheHandle;
