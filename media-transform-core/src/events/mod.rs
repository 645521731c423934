pub mod event_queue;
