pub mod asset_pool;
pub mod observation;
pub mod presence_state;
pub mod screen_dispatcher;
pub mod selector;
