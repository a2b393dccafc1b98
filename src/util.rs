use std::net::{IpAddr, Ipv4Addr, SocketAddr};

const HUB_PORT: &str = "HUB_PORT";

const DEFAULT_PORT: u16 = 8081;

const HUB_ADDR: &str = "HUB_ADDR";

const DEFAULT_ADDR: Ipv4Addr = Ipv4Addr::new(127, 0, 0, 1);

pub fn get_default_bind() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(DEFAULT_ADDR), DEFAULT_PORT)
}

/// Apply `HUB_ADDR` / `HUB_PORT` overrides on top of a configured bind address
pub fn bind_with_env_overrides(configured: SocketAddr) -> SocketAddr {
    let addr = std::env::var(HUB_ADDR)
        .ok()
        .and_then(|res| res.parse::<IpAddr>().ok())
        .unwrap_or(configured.ip());
    let port = std::env::var(HUB_PORT)
        .ok()
        .and_then(|res| res.parse::<u16>().ok())
        .unwrap_or(configured.port());

    SocketAddr::new(addr, port)
}
