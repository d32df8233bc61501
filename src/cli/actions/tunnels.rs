use crate::{
    api::ApiClient,
    cli::actions::{failure, live, signed_in, TunnelAction},
    features::{
        auth::{token_store::write_private, types::UserProfile, Session, TokenStore},
        tunnels::{
            api_checker,
            card::unix_now,
            client,
            dashboard::{beta_badge, can_create},
            services::preset,
            Availability, CreateTunnelForm, Dashboard, TunnelCard,
        },
    },
    poll::{Subscription, STATUS_POLL_INTERVAL},
};
use anyhow::{anyhow, bail, Context, Result};
use std::{fmt::Write as _, path::PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// Handle tunnel actions
pub async fn handle<S: TokenStore>(action: TunnelAction, session: &mut Session<S>) -> Result<()> {
    signed_in(session).await?;
    let api = session.api().clone();

    match action {
        TunnelAction::List => {
            let dashboard = Dashboard::load(&api)
                .await
                .map_err(failure("Failed to load tunnels"))?;
            print!("{}", render(&dashboard, session.user(), unix_now()));
        }

        TunnelAction::Check { subdomain } => {
            let (subdomain, availability) = check(&api, &subdomain).await;
            match availability {
                Availability::Unknown if subdomain.len() < 2 => {
                    bail!("Subdomains need at least 2 characters from a-z, 0-9 and -")
                }
                Availability::Unknown => bail!("Could not check {subdomain}"),
                other => println!("{subdomain}: {}", other.label()),
            }
        }

        TunnelAction::Create {
            subdomain,
            service,
            port,
        } => create(session, &api, &subdomain, &service, port).await?,

        TunnelAction::Toggle { id } => {
            let mut dashboard = Dashboard::load(&api)
                .await
                .map_err(failure("Failed to load tunnels"))?;
            let active = dashboard
                .toggle(&api, id)
                .await
                .map_err(failure("Failed to update tunnel"))?;
            println!("{id}: {}", if active { "enabled" } else { "disabled" });
        }

        TunnelAction::Routing { id, use_device_ip } => {
            let mut dashboard = Dashboard::load(&api)
                .await
                .map_err(failure("Failed to load tunnels"))?;
            dashboard
                .set_routing(&api, id, use_device_ip)
                .await
                .map_err(failure("Failed to update tunnel"))?;
            if let Some(tunnel) = dashboard.find(id) {
                println!("{}: routing to {}", tunnel.subdomain, tunnel.routing_ip());
            }
        }

        TunnelAction::Delete { id } => {
            let mut dashboard = Dashboard::default();
            dashboard
                .delete(session, id)
                .await
                .map_err(failure("Failed to delete tunnel"))?;
            println!("Tunnel {id} deleted.");
        }

        TunnelAction::Config { id, output } => download(&api, id, output).await?,

        TunnelAction::Watch => watch(session, &api).await?,
    }

    Ok(())
}

/// Runs one debounced availability check.
async fn check(api: &ApiClient, raw: &str) -> (String, Availability) {
    let mut checker = api_checker(api.clone());
    let subdomain = checker.input(raw);
    let availability = checker.settle().await;
    (subdomain, availability)
}

async fn create<S: TokenStore>(
    session: &mut Session<S>,
    api: &ApiClient,
    subdomain: &str,
    service: &str,
    port: Option<u16>,
) -> Result<()> {
    if !can_create(session.user()) {
        let (used, max) = session
            .user()
            .map_or((0, 0), |user| (user.tunnel_count, user.max_tunnels));
        bail!("Tunnel limit reached ({used}/{max})");
    }

    let (index, preset) = preset(service).ok_or_else(|| anyhow!("Unknown service: {service}"))?;
    let mut form = CreateTunnelForm::default();
    form.select_preset(index);
    match port {
        Some(port) if preset.is_custom() => form.set_custom_port(&port.to_string()),
        Some(port) if port != preset.port => {
            bail!("{} always uses port {}, use --service custom", preset.label, preset.port)
        }
        _ => {}
    }

    let (subdomain, availability) = check(api, subdomain).await;
    form.set_subdomain(&subdomain);
    form.set_availability(availability);
    if let Some(url) = form.preview_url() {
        debug!(%url, "creating tunnel");
    }

    let mut dashboard = Dashboard::default();
    let tunnel = dashboard
        .create(session, &form)
        .await
        .map_err(failure("Failed to create tunnel"))?;

    println!("https://{} -> port {}", tunnel.full_domain, tunnel.target_port);
    println!("id: {}", tunnel.id);
    println!("Run `homeaccess tunnels config {}` to get the WireGuard file.", tunnel.id);
    Ok(())
}

async fn download(api: &ApiClient, id: Uuid, output: Option<PathBuf>) -> Result<()> {
    let output = match output {
        Some(path) => path,
        None => {
            let dashboard = Dashboard::load(api)
                .await
                .map_err(failure("Failed to load tunnels"))?;
            let tunnel = dashboard
                .find(id)
                .ok_or_else(|| anyhow!("No tunnel with id {id}"))?;
            PathBuf::from(TunnelCard::new(tunnel, None).config_filename())
        }
    };

    let config = client::download_config(api, id)
        .await
        .map_err(failure("Failed to download the configuration"))?;
    write_private(&output, config.as_bytes())
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("WireGuard configuration saved to {}", output.display());
    println!("{}", output.display());
    Ok(())
}

/// Live dashboard until Ctrl-C.
async fn watch<S: TokenStore>(session: &Session<S>, api: &ApiClient) -> Result<()> {
    let mut dashboard = Dashboard::load(api)
        .await
        .map_err(failure("Failed to load tunnels"))?;

    let poll_api = api.clone();
    let mut status = Subscription::start("tunnel-status", STATUS_POLL_INTERVAL, move || {
        let api = poll_api.clone();
        async move { client::fetch_status(&api).await }
    });

    live(&mut status, &mut dashboard, Dashboard::set_status, |dashboard| {
        render(dashboard, session.user(), unix_now())
    })
    .await
}

fn render(dashboard: &Dashboard, user: Option<&UserProfile>, now: i64) -> String {
    let mut out = String::new();
    let cards = dashboard.cards();

    if let Some(user) = user {
        let _ = write!(out, "{}  tunnels {}/{}", user.email, user.tunnel_count, user.max_tunnels);
        if let Some(badge) = beta_badge(Some(user)) {
            let _ = write!(out, "  ({badge})");
        }
        if !can_create(Some(user)) {
            out.push_str("  quota reached");
        }
        out.push('\n');
    }
    if cards.is_empty() {
        out.push_str("No tunnels yet, create one with `homeaccess tunnels create <subdomain>`.\n");
        return out;
    }

    for card in &cards {
        let _ = write!(out, "\n{}  [{}]", card.public_url, card.state_label());
        if let Some(connection) = card.connection_label() {
            let _ = write!(out, " {connection}");
        }
        if let Some(uptime) = card.uptime(now) {
            let _ = write!(out, " {uptime}");
        }
        let _ = writeln!(
            out,
            "\n  {} on port {}, routed via {} ({})\n  id {}",
            card.service,
            card.port,
            card.routing_label(),
            card.routing_ip,
            card.id
        );
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::features::{auth::MemoryTokenStore, tunnels::PeerStatus};
    use serde_json::{json, Value};
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const NAS: &str = "0b5cf0f4-5b8d-4d4e-a1e3-44f1f0c8e6a1";

    fn profile(count: u32, max: u32) -> Value {
        json!({
            "id": "7d8f6c2e-35a8-4a7e-9a55-0d1b8f8e1c11",
            "email": "jo@example.com",
            "is_beta_tester": true,
            "max_tunnels": max,
            "tunnel_count": count
        })
    }

    fn tunnel() -> Value {
        json!({
            "id": NAS,
            "subdomain": "nas",
            "target_port": 8096,
            "service_type": "jellyfin",
            "vpn_ip": "172.16.0.2",
            "device_ip": "192.168.1.20",
            "is_active": true,
            "full_domain": "nas.homeaccess.site",
            "created_at": "2026-01-01T00:00:00Z"
        })
    }

    async fn signed_in_session(server: &MockServer, count: u32, max: u32) -> Session<MemoryTokenStore> {
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile(count, max)))
            .mount(server)
            .await;
        let api = ApiClient::with_base_url(&server.uri(), Duration::from_secs(5)).unwrap();
        Session::start(api, MemoryTokenStore::with_token("tok")).unwrap()
    }

    #[tokio::test]
    async fn create_refuses_when_quota_is_used_up() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tunnels/"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;
        let mut session = signed_in_session(&server, 3, 3).await;

        let err = handle(
            TunnelAction::Create {
                subdomain: "nas".to_string(),
                service: "jellyfin".to_string(),
                port: None,
            },
            &mut session,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Tunnel limit reached (3/3)");
    }

    #[tokio::test]
    async fn taken_subdomain_is_not_submitted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tunnels/check-subdomain"))
            .and(query_param("subdomain", "nas"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "subdomain": "nas", "available": false })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/tunnels/"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;
        let mut session = signed_in_session(&server, 0, 3).await;

        let err = handle(
            TunnelAction::Create {
                subdomain: "NAS".to_string(),
                service: "jellyfin".to_string(),
                port: None,
            },
            &mut session,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "This subdomain is already taken");
    }

    #[tokio::test]
    async fn config_is_written_under_the_tunnel_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/tunnels/{NAS}/config")))
            .respond_with(ResponseTemplate::new(200).set_body_string("[Interface]\nPrivateKey = x\n"))
            .expect(1)
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nas.conf");
        let api = ApiClient::with_base_url(&server.uri(), Duration::from_secs(5)).unwrap();

        download(&api, Uuid::parse_str(NAS).unwrap(), Some(output.clone()))
            .await
            .unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("[Interface]"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&output).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn render_shows_cards_and_quota() {
        let tunnels = serde_json::from_value(json!([tunnel()])).unwrap();
        let status = [(
            Uuid::parse_str(NAS).unwrap(),
            PeerStatus {
                connected: true,
                connected_since: 1_000,
            },
        )]
        .into_iter()
        .collect();
        let dashboard = Dashboard::new(tunnels, status);
        let user: UserProfile = serde_json::from_value(profile(1, 1)).unwrap();

        let out = render(&dashboard, Some(&user), 1_000 + 7200);
        assert!(out.contains("tunnels 1/1"));
        assert!(out.contains("free beta-tester account"));
        assert!(out.contains("quota reached"));
        assert!(out.contains("https://nas.homeaccess.site  [Active] Connected 2h"));
        assert!(out.contains("Jellyfin on port 8096, routed via VPN (172.16.0.2)"));
    }

    #[test]
    fn render_empty_dashboard() {
        let out = render(&Dashboard::default(), None, 0);
        assert!(out.contains("No tunnels yet"));
    }
}
