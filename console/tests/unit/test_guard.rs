//! Route guard tests

use shipkit::app::guard::{allows, route_for, Route};
use shipkit_api::PlatformStatus;

fn platform(admin_initialized: bool, domain_initialized: bool) -> PlatformStatus {
    PlatformStatus {
        status: "ok".to_string(),
        admin_initialized,
        domain_initialized,
    }
}

#[test]
fn test_fresh_platform_goes_to_register() {
    assert_eq!(route_for(&platform(false, false), false), Route::Register);
    // an existing session does not skip registration
    assert_eq!(route_for(&platform(false, false), true), Route::Register);
}

#[test]
fn test_logged_out_goes_to_login() {
    assert_eq!(route_for(&platform(true, false), false), Route::Login);
    assert_eq!(route_for(&platform(true, true), false), Route::Login);
}

#[test]
fn test_missing_domain_goes_to_domain_setup() {
    assert_eq!(route_for(&platform(true, false), true), Route::DomainSetup);
}

#[test]
fn test_initialized_platform_reaches_dashboard() {
    let route = route_for(&platform(true, true), true);
    assert_eq!(route, Route::Dashboard);
    assert!(allows(route, Route::Dashboard));
    assert!(allows(route, Route::Login));
    assert_eq!(route.to_string(), "dashboard");
}

#[test]
fn test_dashboard_blocked_before_domain_setup() {
    let route = route_for(&platform(true, false), true);
    assert!(!allows(route, Route::Dashboard));
    assert!(allows(route, Route::DomainSetup));
    assert!(route.hint().contains("shipkit domain setup"));
}
