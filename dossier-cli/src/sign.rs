use crate::{args::SignArgs, util::header_name};
use dossier_config::api;
use hmac_signatures::{Clock, Payload, Signer, SignerConfig};
use miette::IntoDiagnostic;

fn signer(config: &api::Configuration) -> miette::Result<Signer> {
    Signer::new(SignerConfig {
        client_id: config.client_id.to_string(),
        secret_key: config.secret_key.to_string(),
        tenant_id: config.tenant_id.to_string(),
    })
    .map_err(miette::Report::new)
}

pub fn do_it(config: &api::Configuration, args: SignArgs) -> miette::Result<()> {
    let mut signer = signer(config)?;
    if let Some(timestamp) = args.timestamp {
        signer = signer.with_clock(Clock::from_unix_timestamp(timestamp));
    }

    let headers = signer
        .generate_headers(
            args.method.as_str(),
            &args.url,
            args.body.as_deref().map(Payload::Text).as_ref(),
        )
        .into_diagnostic()?;

    for (name, value) in headers.iter() {
        println!("{}: {value}", header_name(name.as_str()));
    }

    Ok(())
}
