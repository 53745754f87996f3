//! Dual-target comparison.
//!
//! Fires the same request at the production target and, through a connect-to
//! override, at one specific backend. Both responses must meet the
//! requirements; for an expected `200` their decoded bodies must also hash to
//! the same SHA-256 digest. Headers may differ freely between backends.

use log::{debug, warn};
use sha2::{Digest, Sha256};

use crate::config::{Config, COMPARE_ID_SUFFIX, HTTP_STATUS_OK};
use crate::error_handling::Failure;
use crate::matcher::{check, RequirementSet};
use crate::request::{FiredResult, RequestSpec};
use crate::template::Template;
use crate::transport::ConnectTo;

/// Hex SHA-256 of a body.
pub fn body_digest(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

async fn fire_and_check(
    spec: &RequestSpec,
    requirements: &RequirementSet,
    template: &Template,
    config: &Config,
) -> Result<FiredResult, Failure> {
    let result = spec.fire(config).await?;
    check(&result, requirements, template)?;
    Ok(result)
}

/// Fires `spec` untouched and via `connect_to`, then compares.
///
/// The two fires run concurrently and both complete before anything is
/// compared. The second fire carries a child identity (`<id>-B`) so the two
/// requests can be told apart in server logs.
///
/// # Errors
///
/// - the failure of the untouched fire, as is
/// - the failure of the connect-to fire, wrapped in [`Failure::ConnectTo`]
/// - [`Failure::Both`] when both fail
/// - [`Failure::DigestMismatch`] when both pass, `200` is expected and the
///   decoded bodies differ
pub async fn fire_and_compare(
    spec: &RequestSpec,
    requirements: &RequirementSet,
    connect_to: &ConnectTo,
    config: &Config,
) -> Result<(), Failure> {
    let template = config.template();
    let derived = spec.via(connect_to.clone(), COMPARE_ID_SUFFIX);
    debug!(
        "Comparing {} ({}) against connect-to {} ({})",
        spec.url(),
        spec.request_id(),
        connect_to,
        derived.request_id()
    );

    let (primary, secondary) = tokio::join!(
        fire_and_check(spec, requirements, &template, config),
        fire_and_check(&derived, requirements, &template, config),
    );
    let secondary = secondary.map_err(|failure| Failure::ConnectTo {
        connect_to: connect_to.to_string(),
        failure: Box::new(failure),
    });

    let (primary, secondary) = match (primary, secondary) {
        (Ok(primary), Ok(secondary)) => (primary, secondary),
        (Err(primary), Ok(_)) => return Err(primary),
        (Ok(_), Err(secondary)) => return Err(secondary),
        (Err(primary), Err(secondary)) => {
            return Err(Failure::Both {
                primary: Box::new(primary),
                secondary: Box::new(secondary),
            })
        }
    };

    if requirements.expected_status() != Some(HTTP_STATUS_OK) {
        debug!("Expected status is not {HTTP_STATUS_OK}, skipping body digest comparison");
        return Ok(());
    }

    let primary_digest = body_digest(&primary.body_decoded);
    let secondary_digest = body_digest(&secondary.body_decoded);
    if primary_digest != secondary_digest {
        warn!(
            "Body of {} differs via connect-to {}: {} != {}",
            spec.url(),
            connect_to,
            primary_digest,
            secondary_digest
        );
        return Err(Failure::DigestMismatch {
            connect_to: connect_to.to_string(),
            primary: primary_digest,
            secondary: secondary_digest,
        });
    }
    Ok(())
}
