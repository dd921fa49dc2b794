//! Route guard

use std::fmt;

use shipkit_api::PlatformStatus;

/// Screen the operator is allowed to reach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// No admin account exists yet
    Register,
    Login,
    DomainSetup,
    Dashboard,
}

impl Route {
    /// Command that moves the operator forward from this route
    pub fn hint(&self) -> &'static str {
        match self {
            Route::Register => "No admin account yet. Run `shipkit register` to create one.",
            Route::Login => "Not logged in. Run `shipkit login`.",
            Route::DomainSetup => "No domain configured. Run `shipkit domain setup <domain>`.",
            Route::Dashboard => "Ready. Run `shipkit list` or `shipkit watch`.",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Route::Register => "register",
            Route::Login => "login",
            Route::DomainSetup => "domain-setup",
            Route::Dashboard => "dashboard",
        };
        f.write_str(name)
    }
}

/// Decide where the operator belongs
pub fn route_for(status: &PlatformStatus, authenticated: bool) -> Route {
    if !status.admin_initialized {
        Route::Register
    } else if !authenticated {
        Route::Login
    } else if !status.domain_initialized {
        Route::DomainSetup
    } else {
        Route::Dashboard
    }
}

/// Whether a command that needs `required` may run given the current route
pub fn allows(current: Route, required: Route) -> bool {
    match required {
        Route::Register => current == Route::Register,
        Route::Login => current != Route::Register,
        Route::DomainSetup => matches!(current, Route::DomainSetup | Route::Dashboard),
        Route::Dashboard => current == Route::Dashboard,
    }
}
