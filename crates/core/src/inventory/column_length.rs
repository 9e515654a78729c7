//! Maximum lengths of the text columns imported values land in.

pub const NAME: usize = 200;
pub const TYPE: usize = 80;
pub const EXTERNAL_ID: usize = 255;
pub const DESCRIPTION: usize = 500;
pub const TEXT_2KB: usize = 2048;
pub const WEB_SITE: usize = 2048;
pub const PHONE: usize = 20;
