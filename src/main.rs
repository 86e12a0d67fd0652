//! Interactive front-end: search a dossier by email, show the recap and the
//! completeness checklist, generate the pre-filled link on demand.
//!
//! `--check` runs the Grist and Démarches Simplifiées connection self-tests
//! and exits. One action runs at a time; every search re-fetches fresh data
//! and discards the previous record.

use std::io::{self, BufRead, Write};

use bilan_prefill::checklist::{is_valid_email, missing_required_fields, parse_amount};
use bilan_prefill::config::Config;
use bilan_prefill::demarches::{map_to_external, PrefillClient};
use bilan_prefill::grist::{resolve_case, GristClient};
use bilan_prefill::types::CaseRecord;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = Config::from_env();

    if std::env::args().any(|a| a == "--check") {
        run_checks(&config).await;
        return;
    }

    run_interactive(&config).await;
}

/// Connection self-tests, mirroring what the components will do live.
async fn run_checks(config: &Config) {
    let grist = GristClient::new(config);
    match grist.check_connection().await {
        Ok(summary) => println!("{}", summary),
        Err(err) => {
            eprintln!("Échec de la connexion à Grist: {}", err);
            std::process::exit(1);
        }
    }

    let prefill = PrefillClient::new(config);
    match prefill.check_connection(&config.demarche_id).await {
        Ok(url) => println!("Connexion à l'API DS réussie. URL de test: {}", url),
        Err(err) => {
            eprintln!("Échec de la connexion à l'API DS: {}", err);
            std::process::exit(1);
        }
    }
}

async fn run_interactive(config: &Config) {
    let grist = GristClient::new(config);
    let prefill = PrefillClient::new(config);
    let stdin = io::stdin();

    println!("Création dossier bilan Drac Draaf");
    println!("Recherche par email (ligne vide pour quitter)");
    println!();

    loop {
        let Some(email) = prompt(&stdin, "Email : ") else {
            break;
        };
        if email.is_empty() {
            break;
        }
        if !is_valid_email(&email) {
            println!("⚠ Format d'email invalide");
            println!();
            continue;
        }

        let record = match resolve_case(&grist, config, &email).await {
            Ok(record) => record,
            Err(err) => {
                println!("⚠ Erreur lors de la recherche: {}", err);
                println!();
                continue;
            }
        };

        print_recap(&record);

        let missing = missing_required_fields(&record);
        if !missing.is_empty() {
            println!("Champs manquants: {}", missing.join(", "));
            println!();
            continue;
        }

        let Some(answer) = prompt(&stdin, "Générer le dossier bilan Drac Draaf ? [o/N] ") else {
            break;
        };
        if !answer.eq_ignore_ascii_case("o") {
            println!();
            continue;
        }

        match prefill
            .generate(&map_to_external(&record), &config.demarche_id)
            .await
        {
            Ok(url) => println!("✓ Dossier pré-rempli: {}", url),
            Err(err) => println!("✗ Erreur: {}", err),
        }
        println!();
    }
}

fn prompt(stdin: &io::Stdin, label: &str) -> Option<String> {
    print!("{}", label);
    io::stdout().flush().ok()?;
    let mut line = String::new();
    match stdin.lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

fn print_recap(record: &CaseRecord) {
    println!();
    println!("Récapitulatif des données");
    print_field("Nom", &record.name, !record.name.is_empty());
    print_field("Email", &record.email, is_valid_email(&record.email));
    print_field(
        "Titre du projet",
        &record.project_title,
        !record.project_title.is_empty(),
    );
    print_field(
        "Numéro de dossier",
        &record.case_number,
        !record.case_number.is_empty(),
    );
    print_field(
        "Montant DRAC",
        &format!("{} €", record.drac_amount),
        parse_amount(&record.drac_amount) > 0,
    );
    print_field(
        "Montant DRAAF",
        &format!("{} €", record.draaf_amount),
        parse_amount(&record.draaf_amount) > 0,
    );
    println!();
}

fn print_field(label: &str, value: &str, ok: bool) {
    let marker = if ok { "✓" } else { "○" };
    let shown = if value.is_empty() {
        "Non renseigné"
    } else {
        value
    };
    println!("  {} {:<18} {}", marker, label, shown);
}
