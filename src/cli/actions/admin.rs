use crate::{
    api::ApiClient,
    cli::actions::{failure, live, redirect_message, AdminAction},
    features::{
        admin::{client, ActivityEntry, ActivityQuery, AdminPanel},
        auth::{Session, TokenStore},
        tunnels::card::unix_now,
    },
    poll::{Subscription, STATUS_POLL_INTERVAL},
};
use anyhow::{bail, Result};
use std::fmt::Write as _;

/// Handle admin actions
pub async fn handle<S: TokenStore>(action: AdminAction, session: &mut Session<S>) -> Result<()> {
    session.refresh_user().await?;
    if let Err(route) = session.require_admin() {
        bail!(redirect_message(&route));
    }
    let api = session.api().clone();

    match action {
        AdminAction::Activity {
            limit,
            offset,
            search,
        } => {
            let query = ActivityQuery::new(limit, offset, search.as_deref())?;
            let entries = client::activity(&api, &query)
                .await
                .map_err(failure("Failed to load the activity log"))?;
            print!("{}", render_activity(&entries, &query));
        }

        AdminAction::Users => print!("{}", render_users(&load(&api).await?)),
        AdminAction::Tunnels => print!("{}", render_tunnels(&load(&api).await?, unix_now())),

        AdminAction::Ban { id } => {
            let active = load(&api)
                .await?
                .toggle_ban(&api, id)
                .await
                .map_err(failure("Failed to update user"))?;
            println!("{id}: {}", if active { "unbanned" } else { "banned" });
        }

        AdminAction::Quota { id, max_tunnels } => {
            load(&api)
                .await?
                .set_quota(&api, id, max_tunnels)
                .await
                .map_err(failure("Failed to update user"))?;
            println!("{id}: quota set to {max_tunnels}");
        }

        AdminAction::Beta { id, enabled } => {
            load(&api)
                .await?
                .set_beta(&api, id, enabled)
                .await
                .map_err(failure("Failed to update user"))?;
            println!("{id}: beta tester {}", if enabled { "on" } else { "off" });
        }

        AdminAction::DeleteUser { id } => {
            load(&api)
                .await?
                .delete_user(&api, id)
                .await
                .map_err(failure("Failed to delete user"))?;
            println!("User {id} deleted.");
        }

        AdminAction::ToggleTunnel { id } => {
            let active = load(&api)
                .await?
                .toggle_tunnel(&api, id)
                .await
                .map_err(failure("Failed to update tunnel"))?;
            println!("{id}: {}", if active { "enabled" } else { "disabled" });
        }

        AdminAction::Watch => {
            let mut panel = load(&api).await?;
            let poll_api = api.clone();
            let mut status = Subscription::start("admin-status", STATUS_POLL_INTERVAL, move || {
                let api = poll_api.clone();
                async move { client::fetch_status(&api).await }
            });
            live(&mut status, &mut panel, AdminPanel::set_status, |panel| {
                render_tunnels(panel, unix_now())
            })
            .await?;
        }
    }

    Ok(())
}

async fn load(api: &ApiClient) -> Result<AdminPanel> {
    AdminPanel::load(api)
        .await
        .map_err(failure("Failed to load the admin panel"))
}

fn render_users(panel: &AdminPanel) -> String {
    let mut out = String::new();
    for user in panel.users() {
        let mut flags = Vec::new();
        if user.is_admin {
            flags.push("admin");
        }
        if !user.is_active {
            flags.push("banned");
        }
        if !user.is_verified {
            flags.push("unverified");
        }
        if user.is_beta_tester {
            flags.push("beta");
        }
        let _ = write!(out, "{}  {}", user.id, user.email);
        if !flags.is_empty() {
            let _ = write!(out, " [{}]", flags.join(", "));
        }
        let _ = writeln!(
            out,
            "  tunnels {}/{}, {} connected",
            user.tunnel_count,
            user.max_tunnels,
            panel.connected_count(user.id)
        );
    }
    out
}

fn render_tunnels(panel: &AdminPanel, now: i64) -> String {
    let mut out = String::new();
    for (owner, tunnels) in panel.tunnels_by_user() {
        let email = tunnels.first().map_or("", |tunnel| tunnel.user_email.as_str());
        let _ = writeln!(
            out,
            "{email} ({} connected)",
            panel.connected_count(owner)
        );
        for tunnel in tunnels {
            let status = panel.status_of(tunnel.id);
            let state = match (tunnel.is_active, status.connected) {
                (false, _) => "inactive",
                (true, true) => "connected",
                (true, false) => "disconnected",
            };
            let _ = write!(
                out,
                "  {}  {} -> {}  {state}",
                tunnel.id, tunnel.full_domain, tunnel.target_port
            );
            if let Some(uptime) = panel.uptime(tunnel.id, now) {
                let _ = write!(out, " {uptime}");
            }
            out.push('\n');
        }
    }
    if out.is_empty() {
        out.push_str("No tunnels.\n");
    }
    out
}

fn render_activity(entries: &[ActivityEntry], query: &ActivityQuery) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = write!(out, "{}  {}  {}", entry.created_at, entry.user_email, entry.action);
        if let Some(detail) = &entry.detail {
            let _ = write!(out, "  {detail}");
        }
        out.push('\n');
    }
    if entries.len() == query.limit as usize {
        let _ = writeln!(out, "More: --offset {}", query.next_page().offset);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{api::ApiClient, features::auth::MemoryTokenStore};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn non_admin_is_turned_away() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "7d8f6c2e-35a8-4a7e-9a55-0d1b8f8e1c11",
                "email": "jo@example.com",
                "is_admin": false,
                "max_tunnels": 3
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let api = ApiClient::with_base_url(&server.uri(), Duration::from_secs(5)).unwrap();
        let mut session = Session::start(api, MemoryTokenStore::with_token("tok")).unwrap();

        let err = handle(AdminAction::Users, &mut session).await.unwrap_err();
        assert!(err.to_string().contains("admin account"));
    }

    #[tokio::test]
    async fn activity_skips_loading_the_panel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "7d8f6c2e-35a8-4a7e-9a55-0d1b8f8e1c11",
                "email": "root@example.com",
                "is_admin": true,
                "max_tunnels": 3
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/activity"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let api = ApiClient::with_base_url(&server.uri(), Duration::from_secs(5)).unwrap();
        let mut session = Session::start(api, MemoryTokenStore::with_token("tok")).unwrap();

        handle(
            AdminAction::Activity {
                limit: 50,
                offset: 0,
                search: None,
            },
            &mut session,
        )
        .await
        .unwrap();
    }

    #[test]
    fn activity_render_offers_next_page_when_full() {
        let entry: ActivityEntry = serde_json::from_value(json!({
            "id": "2f1d4c8e-93b0-4b1a-8d47-3c7a1e9f0b55",
            "user_email": "jo@example.com",
            "action": "donation",
            "detail": "5.00€",
            "created_at": "2026-01-01T00:00:00Z"
        }))
        .unwrap();
        let query = ActivityQuery::new(1, 0, None).unwrap();

        let out = render_activity(&[entry], &query);
        assert!(out.contains("jo@example.com  donation  5.00€"));
        assert!(out.contains("More: --offset 1"));
    }

    #[test]
    fn empty_panel_renders_placeholder() {
        assert_eq!(render_tunnels(&AdminPanel::default(), 0), "No tunnels.\n");
        assert_eq!(render_users(&AdminPanel::default()), "");
    }
}
