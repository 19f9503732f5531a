//! 浏览器接入层
//!
//! 两种取得 `Browser` 的方式：
//! - `connection` - 连接到已开启调试端口的浏览器（抓地图建议用这种，
//!   可以先人工处理登录 / 验证）
//! - `headless` - 自行启动无头浏览器
//!
//! 工作者各自从 `Browser` 建立专属分页，本层不创建分页。

pub mod connection;
pub mod headless;

pub use connection::connect_to_browser;
pub use headless::launch_headless_browser;
