pub mod naming_style;
pub mod telegram_utils;
