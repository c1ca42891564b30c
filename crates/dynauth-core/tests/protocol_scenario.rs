// ─────────────────────────────────────────────────────────────────────
// Dynauth — Protocol Scenario Tests
// ─────────────────────────────────────────────────────────────────────
//! End-to-end rounds between a server and clients that only exchange
//! JSON-encoded challenges and responses.

use dynauth_core::{AuthClient, AuthServer};
use dynauth_types::{AuthConfig, AuthStatus, Challenge, Response, Secret};

fn over_the_wire<T: serde::Serialize + serde::de::DeserializeOwned>(value: &T) -> T {
    let json = serde_json::to_string(value).unwrap();
    serde_json::from_str(&json).unwrap()
}

fn round(server: &AuthServer, client: &AuthClient, as_device: &str) -> (Response, AuthStatus) {
    let challenge: Challenge = over_the_wire(&server.create_challenge(client.device_id()).unwrap());
    let response: Response = over_the_wire(&client.respond_to_challenge(&challenge).unwrap());
    let status = server.verify_response(as_device, &response);
    (response, status)
}

#[test]
fn test_full_protocol_scenario() {
    let secret = Secret::from_json(r#"{"k": 2.5, "gamma": 0.8, "seed": 12345}"#).unwrap();
    let server = AuthServer::new(AuthConfig::default()).unwrap();
    server.register_device("device-001", secret);

    let legit = AuthClient::new("device-001", secret, AuthConfig::default()).unwrap();
    let (response, status) = round(&server, &legit, "device-001");
    assert_eq!(status, AuthStatus::Success);
    assert_eq!(status.code(), "AUTH_SUCCESS");

    assert_eq!(
        server.verify_response("device-001", &response),
        AuthStatus::Replay
    );

    let impostor =
        AuthClient::new("device-001", Secret::new(3.0, 0.5, 99999), AuthConfig::default())
            .unwrap();
    let (_, status) = round(&server, &impostor, "device-001");
    assert_eq!(status, AuthStatus::InvalidResponse);

    assert_eq!(server.pending_count(), 0);
    assert_eq!(server.used_count(), 2);
}

#[test]
fn test_many_devices_interleaved() {
    let server = AuthServer::default();
    let clients: Vec<AuthClient> = (0..4)
        .map(|i| {
            let secret = Secret::new(1.5 + i as f64 * 0.5, 0.4 + i as f64 * 0.1, 1000 + i);
            let id = format!("device-{i:03}");
            server.register_device(id.clone(), secret);
            AuthClient::new(id, secret, AuthConfig::default()).unwrap()
        })
        .collect();

    let challenges: Vec<Challenge> = clients
        .iter()
        .map(|c| server.create_challenge(c.device_id()).unwrap())
        .collect();
    assert_eq!(server.pending_count(), 4);

    for (client, challenge) in clients.iter().zip(&challenges).rev() {
        let response = client.respond_to_challenge(challenge).unwrap();
        assert_eq!(
            server.verify_response(client.device_id(), &response),
            AuthStatus::Success
        );
    }
    assert_eq!(server.pending_count(), 0);
}

#[test]
fn test_stolen_response_cannot_be_reused_by_other_device() {
    let server = AuthServer::default();
    let secret = Secret::new(2.5, 0.8, 12345);
    server.register_device("device-001", secret);
    server.register_device("device-002", Secret::new(2.0, 0.6, 7));
    let client = AuthClient::new("device-001", secret, AuthConfig::default()).unwrap();

    let (response, status) = round(&server, &client, "device-002");
    assert_eq!(status, AuthStatus::DeviceMismatch);
    assert_eq!(
        server.verify_response("device-001", &response),
        AuthStatus::Success
    );
    assert_eq!(
        server.verify_response("device-002", &response),
        AuthStatus::Replay
    );
}

#[test]
fn test_mismatched_config_fails_verification() {
    let secret = Secret::new(2.5, 0.8, 12345);
    let server = AuthServer::default();
    server.register_device("device-001", secret);
    let skewed = AuthConfig {
        dt: 0.05,
        ..Default::default()
    };
    let client = AuthClient::new("device-001", secret, skewed).unwrap();
    let (_, status) = round(&server, &client, "device-001");
    assert_eq!(status, AuthStatus::InvalidResponse);
}

#[test]
fn test_config_loaded_from_json() {
    let config = AuthConfig::from_json(r#"{"challenge_length": 12, "challenge_timeout_s": 5.0}"#)
        .unwrap();
    let server = AuthServer::new(config.clone()).unwrap();
    let secret = Secret::new(2.5, 0.8, 1);
    server.register_device("d", secret);
    let challenge = server.create_challenge("d").unwrap();
    assert_eq!(challenge.len(), 12);

    let client = AuthClient::new("d", secret, config).unwrap();
    let response = client.respond_to_challenge(&challenge).unwrap();
    assert_eq!(
        server.verify_response_at("d", &response, challenge.issued_at_s + 6.0),
        AuthStatus::Expired
    );
}
