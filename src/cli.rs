// src/cli.rs

use clap::Parser;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::service::VaultService;
use crate::transfer::ExportMode;
use crate::web::run_web_server;

// === CLI ===

#[derive(Parser)]
#[command(name = "accstorage", author, version, about = "Хранилище учётных данных организаций", long_about = None)]
pub struct Cli {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "config.yaml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand)]
pub enum Command {
    /// Запустить веб-API
    Serve {
        /// Адрес (по умолчанию из web_server.address)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Создать единственного суперадмина
    Superadmin {
        #[arg(long)]
        nom: String,
        #[arg(long)]
        prenom: String,
        #[arg(long)]
        identifiant: String,
        #[arg(long = "mot-de-passe")]
        mot_de_passe: String,
    },
    /// Организации
    Org {
        #[command(subcommand)]
        cmd: OrgCommand,
    },
    /// Экспорт записей организации в CSV (stdout)
    Export {
        #[arg(long)]
        org: Uuid,
        /// Расшифровать (нужен пароль суперадмина)
        #[arg(long, requires = "password")]
        clear: bool,
        #[arg(long)]
        password: Option<String>,
    },
}

#[derive(clap::Subcommand)]
pub enum OrgCommand {
    List {
        #[arg(short, long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self, config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
        let service = Arc::new(VaultService::from_config(&config)?);

        match self.command {
            Command::Serve { addr } => {
                let addr = addr.unwrap_or_else(|| config.web_server.address.clone());
                let audit = service.events().spawn_logger();
                run_web_server(service.clone(), &addr, config.web_server.max_request_size).await?;
                audit.abort();
            }
            Command::Superadmin { nom, prenom, identifiant, mot_de_passe } => {
                let admin = service
                    .pipeline()
                    .provision_superadmin(&nom, &prenom, &identifiant, &mot_de_passe)
                    .await?;
                println!("✅ Суперадмин создан: {} {} ({})", admin.first_name, admin.last_name, admin.id);
            }
            Command::Org { cmd } => handle_org(cmd, &service).await?,
            Command::Export { org, clear, password } => {
                let mode = if clear { ExportMode::Clear } else { ExportMode::Encrypted };
                let csv = service
                    .pipeline()
                    .codec()
                    .export_records(org, mode, password.as_deref())
                    .await?;
                print!("{}", csv);
            }
        }

        Ok(())
    }
}

// === Обработчики ===

async fn handle_org(cmd: OrgCommand, service: &VaultService) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        OrgCommand::List { json } => {
            let orgs = service.store().list_organizations().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&orgs)?);
            } else {
                for org in &orgs {
                    let count = service.store().count_records(org.id).await?;
                    println!("{} | {} | {} записей", org.name, org.id, count);
                }
            }
        }
    }
    Ok(())
}
