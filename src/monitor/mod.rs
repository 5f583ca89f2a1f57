mod session;

pub use session::MonitorSession;
