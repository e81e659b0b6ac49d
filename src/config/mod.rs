mod settings;

pub use settings::{
    ConfluenceConfig, DEFAULT_SLACK_API_BASE_URL, DEFAULT_SLACK_ARCHIVE_BASE_URL, HttpConfig,
    PrimarySpace, Settings, SlackConfig, load_settings, settings_from, split_spaces,
};
