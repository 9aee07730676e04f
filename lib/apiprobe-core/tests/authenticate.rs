#![allow(missing_docs, clippy::expect_used)]

use rstest::rstest;

use apiprobe_core::{AuthFailure, Credentials, ProbeRunner, SuccessCodes, TokenScheme, UserId};

mod common;
pub use self::common::*;

#[rstest]
#[tokio::test]
async fn should_authenticate_and_extract_profile(#[future] api: MockApi) -> anyhow::Result<()> {
    let api = api.await;
    let runner = ProbeRunner::builder(api.base_url.as_str()).build()?;

    let session = runner
        .authenticate(&Credentials::new("admin", "admin123")?)
        .await?;

    assert!(session.is_authenticated());
    assert_eq!(session.token().map(|token| token.as_str()), Some(TOKEN));
    assert_eq!(session.base_url(), runner.base_url());

    let profile = session.profile().expect("profile");
    assert_eq!(profile.user_id, Some(UserId::Number(1)));
    assert_eq!(profile.username.as_deref(), Some("admin"));
    assert_eq!(profile.role.as_deref(), Some("admin"));
    assert_eq!(profile.email, None);

    assert_eq!(api.hits(), ["POST /api/auth/login/"]);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn should_report_rejected_credentials(#[future] api: MockApi) -> anyhow::Result<()> {
    let api = api.await;
    let runner = ProbeRunner::builder(api.base_url.as_str()).build()?;

    let failure = runner
        .authenticate(&Credentials::new("test", "test")?)
        .await
        .expect_err("login should fail");

    let AuthFailure::Rejected { status, body } = failure else {
        anyhow::bail!("unexpected failure: {failure:?}");
    };
    assert_eq!(status, 400);
    assert!(body.contains("Unable to log in with provided credentials."));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn should_report_missing_token(#[future] api: MockApi) -> anyhow::Result<()> {
    let api = api.await;
    let runner = ProbeRunner::builder(api.base_url.as_str()).build()?;

    let failure = runner
        .authenticate(&Credentials::new("notoken", "whatever")?)
        .await
        .expect_err("login should fail");

    assert_eq!(
        failure,
        AuthFailure::MissingToken {
            status: 200,
            body: r#"{"detail":"Login successful"}"#.to_string(),
        }
    );
    Ok(())
}

#[rstest]
#[tokio::test]
async fn should_accept_any_2xx_unless_strict(#[future] api: MockApi) -> anyhow::Result<()> {
    let api = api.await;
    let credentials = Credentials::new("created", "whatever")?;

    let runner = ProbeRunner::builder(api.base_url.as_str()).build()?;
    let session = runner.authenticate(&credentials).await?;
    assert_eq!(session.token().map(|token| token.as_str()), Some("xyz"));

    let strict = ProbeRunner::builder(api.base_url.as_str())
        .with_success_codes(SuccessCodes::strict())
        .build()?;
    let failure = strict
        .authenticate(&credentials)
        .await
        .expect_err("201 is not a success in strict mode");
    assert_eq!(failure.status(), Some(201));
    Ok(())
}

#[tokio::test]
async fn should_report_unreachable_server() -> anyhow::Result<()> {
    init_tracing();
    let runner = ProbeRunner::builder(unreachable_base_url().await)
        .with_token_scheme(TokenScheme::Bearer)
        .build()?;

    let failure = runner
        .authenticate(&Credentials::new("admin", "admin123")?)
        .await
        .expect_err("nothing listens");

    assert!(matches!(failure, AuthFailure::Connection { .. }));
    assert_eq!(failure.status(), None);
    Ok(())
}
