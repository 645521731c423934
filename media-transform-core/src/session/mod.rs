pub mod async_transform;
pub mod flow_control;
