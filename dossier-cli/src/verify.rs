use crate::{
    args::VerifyArgs,
    util::{error_kaomoji, success_kaomoji},
};
use dossier_config::api;
use hmac_signatures::{
    header::{X_CLIENT_ID, X_SIGNATURE, X_TENANT_ID, X_TIMESTAMP},
    Payload, Verifier,
};
use http::Request;
use miette::IntoDiagnostic;
use std::time::Duration;

pub fn do_it(config: &api::Configuration, args: VerifyArgs) -> miette::Result<()> {
    let request = Request::builder()
        .method(args.method)
        .uri(&args.url)
        .header(&X_CLIENT_ID, config.client_id.as_str())
        .header(&X_TENANT_ID, config.tenant_id.as_str())
        .header(&X_TIMESTAMP, args.timestamp)
        .header(&X_SIGNATURE, args.signature)
        .body(())
        .into_diagnostic()?;
    let (parts, ()) = request.into_parts();

    let verifier = Verifier::new().tolerance(Duration::from_secs(args.tolerance));
    let result = verifier.verify(
        &parts,
        args.body.as_deref().map(Payload::Text).as_ref(),
        |_client_id, _tenant_id| Ok::<_, core::convert::Infallible>(config.secret_key.to_string()),
    );

    if let Err(error) = result {
        println!("❌ Signature is invalid {}", error_kaomoji());
        return Err(miette::Report::new(error));
    }

    println!("✅ Signature is valid! {}", success_kaomoji());

    Ok(())
}
