mod export;

pub use export::save_json;
