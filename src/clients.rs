//! The client routers served by this application.
//!
//! | prefix             | middleware                      | `GET /`                   |
//! |--------------------|---------------------------------|---------------------------|
//! | `/medium-clients`  | [`MethodGuard`] allowing `GET`  | `"Ruta clientes medium"`  |
//! | `/premium-clients` | [`MountPathHeader`]             | `"Ruta clientes premium"` |

use crate::app::Dispatcher;
use crate::config::ServerConfig;
use crate::error::RouterResult;
use crate::http::Method;
use crate::middleware::{MethodGuard, MountPathHeader};
use crate::router::{build_mount_table, Router};

pub const MEDIUM_CLIENTS: &str = "/medium-clients";
pub const PREMIUM_CLIENTS: &str = "/premium-clients";

pub fn medium_clients_router() -> RouterResult<Router> {
    let mut router = Router::new();
    router.middleware(MethodGuard::only(Method::GET));
    router.get("/", |_req, res| {
        res.send("Ruta clientes medium");
        Ok(())
    })?;
    Ok(router)
}

pub fn premium_clients_router(mount_header: &str) -> RouterResult<Router> {
    let mut router = Router::new();
    router.middleware(MountPathHeader::new(mount_header));
    router.get("/", |_req, res| {
        res.send("Ruta clientes premium");
        Ok(())
    })?;
    Ok(router)
}

/// Assembles the full dispatcher; called once by the bootstrap.
pub fn dispatcher(config: &ServerConfig) -> RouterResult<Dispatcher> {
    let mounts = build_mount_table([
        (MEDIUM_CLIENTS, medium_clients_router()?),
        (PREMIUM_CLIENTS, premium_clients_router(&config.mount_header)?),
    ])?;
    Ok(Dispatcher::from_config(mounts, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_prefixes_are_mounted() {
        let dispatcher = dispatcher(&ServerConfig::default()).unwrap();
        assert_eq!(dispatcher.mounts().prefixes(), vec![MEDIUM_CLIENTS, PREMIUM_CLIENTS]);
    }

    #[test]
    fn routers_register_only_get_root() {
        let medium = medium_clients_router().unwrap();
        assert!(medium.has_route(Method::GET, "/"));
        assert!(!medium.has_route(Method::POST, "/"));
        let premium = premium_clients_router("url").unwrap();
        assert_eq!(premium.allowed_methods("/"), vec![Method::GET, Method::HEAD]);
    }
}
