use crate::{args::RequestArgs, util::error_kaomoji};
use dossier_api::{ApiClient, ApiError, RequestOptions};
use dossier_config::api;
use miette::IntoDiagnostic;
use sonic_rs::Value;
use std::collections::BTreeMap;

fn report_failure(error: &ApiError) {
    eprintln!(
        "Request failed with status {} {}",
        error.status(),
        error_kaomoji()
    );

    if let Some(data) = error.data() {
        if let Ok(pretty) = sonic_rs::to_string_pretty(data) {
            eprintln!("{pretty}");
        }
    }
}

pub async fn do_it(config: &api::Configuration, args: RequestArgs) -> miette::Result<()> {
    let client = ApiClient::new(config)?;

    let params: BTreeMap<String, String> = args.params.into_iter().collect();
    let mut options = RequestOptions::new().params(&params)?;
    if let Some(body) = args.body {
        let body: Value = sonic_rs::from_str(&body).into_diagnostic()?;
        options = options.body(&body)?;
    }

    let response: Value = match client.request(args.method, &args.path, options).await {
        Ok(response) => response,
        Err(error) => {
            report_failure(&error);
            return Err(error.into());
        }
    };

    println!("{}", sonic_rs::to_string_pretty(&response).into_diagnostic()?);

    Ok(())
}
