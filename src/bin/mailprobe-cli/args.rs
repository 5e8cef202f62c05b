use anyhow::{Result, anyhow};
use clap::{ArgAction, Args, Parser, Subcommand};
use mailprobe_lib::{BackendKind, BackendSelection, SmtpOverrides, TestOptions};

#[derive(Parser, Debug)]
#[command(name = "mailprobe-cli", version, about = "Teste la délivrabilité d'adresses e-mail")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    /// adresse à tester (répétable)
    #[arg(short = 'e', long = "email")]
    pub email: Vec<String>,

    /// liste d'adresses séparées par des virgules
    #[arg(long, value_delimiter = ',')]
    pub emails: Vec<String>,

    /// lit des adresses depuis stdin (une par ligne)
    #[arg(long)]
    pub stdin: bool,

    /// fournisseur pour l'envoi de test: aws-ses|smtp|both|none
    #[arg(long, default_value = "none")]
    pub provider: String,

    #[command(flatten)]
    pub smtp: SmtpArgs,

    /// sujet du message de test
    #[arg(long)]
    pub subject: Option<String>,

    /// corps du message de test
    #[arg(long)]
    pub message: Option<String>,

    /// vérifie DNS uniquement, aucun envoi réel
    #[arg(long, visible_alias = "validate-only")]
    pub skip_delivery: bool,

    /// format: human|json|ndjson|csv
    #[arg(long, default_value = "human")]
    pub format: String,

    /// write report to file (JSON/NDJSON/CSV selon --format)
    #[arg(long)]
    pub out: Option<String>,

    /// verbosité des logs sur stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Args, Debug, Default)]
pub struct SmtpArgs {
    /// serveur SMTP (remplace SMTP_HOST)
    #[arg(long, global = true)]
    pub smtp_host: Option<String>,

    /// port SMTP (défaut 587, 465 avec --smtp-secure)
    #[arg(long, global = true)]
    pub smtp_port: Option<u16>,

    /// utilisateur SMTP
    #[arg(long, global = true)]
    pub smtp_user: Option<String>,

    /// mot de passe SMTP
    #[arg(long, global = true)]
    pub smtp_pass: Option<String>,

    /// TLS implicite dès la connexion
    #[arg(long, global = true)]
    pub smtp_secure: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// envoie un vrai message
    Send(SendArgs),
    /// affiche la configuration et teste les connexions
    Status,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// destinataire (répétable)
    #[arg(long, required = true)]
    pub to: Vec<String>,

    /// copie (répétable)
    #[arg(long)]
    pub cc: Vec<String>,

    /// copie cachée (répétable)
    #[arg(long)]
    pub bcc: Vec<String>,

    /// expéditeur (défaut: DEFAULT_FROM_EMAIL et alias)
    #[arg(long)]
    pub from: Option<String>,

    /// adresse de réponse (répétable)
    #[arg(long = "reply-to")]
    pub reply_to: Vec<String>,

    #[arg(long, required = true)]
    pub subject: String,

    /// corps texte
    #[arg(long)]
    pub text: Option<String>,

    /// corps HTML
    #[arg(long)]
    pub html: Option<String>,

    /// fichier joint (répétable)
    #[arg(long)]
    pub attach: Vec<String>,

    /// en-tête supplémentaire "Nom: valeur" (répétable)
    #[arg(long)]
    pub header: Vec<String>,

    /// force un fournisseur: aws-ses|smtp (défaut: SES puis SMTP)
    #[arg(long)]
    pub provider: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }

    pub fn clap_command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }

    /// `--email` then `--emails`, blanks dropped.
    pub fn listed_emails(&self) -> Vec<String> {
        self.email
            .iter()
            .chain(&self.emails)
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty())
            .collect()
    }

    pub fn test_options(&self) -> Result<TestOptions> {
        let backends = self
            .provider
            .parse::<BackendSelection>()
            .map_err(|err| anyhow!(err))?;
        let mut options = TestOptions::default()
            .with_backends(backends)
            .with_skip_delivery(self.skip_delivery);
        if let Some(subject) = &self.subject {
            options = options.with_subject(subject.clone());
        }
        if let Some(message) = &self.message {
            options = options.with_message(message.clone());
        }
        Ok(options)
    }
}

impl SmtpArgs {
    pub fn overrides(&self) -> SmtpOverrides {
        SmtpOverrides {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            username: self.smtp_user.clone(),
            password: self.smtp_pass.clone(),
            secure: self.smtp_secure.then_some(true),
        }
    }
}

impl SendArgs {
    pub fn backend(&self) -> Result<Option<BackendKind>> {
        self.provider
            .as_deref()
            .map(|name| name.parse::<BackendKind>().map_err(|err| anyhow!(err)))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        <Cli as Parser>::try_parse_from(args).expect("valid arguments")
    }

    #[test]
    fn collects_emails_from_both_flags() {
        let cli = parse(&[
            "mailprobe-cli",
            "-e",
            "a@example.com",
            "--email",
            "b@example.com",
            "--emails",
            "c@example.com, ,d@example.com",
        ]);
        assert_eq!(
            cli.listed_emails(),
            ["a@example.com", "b@example.com", "c@example.com", "d@example.com"]
        );
    }

    #[test]
    fn validate_only_alias_sets_skip_delivery() {
        let cli = parse(&["mailprobe-cli", "--validate-only", "--provider", "both"]);
        let options = cli.test_options().expect("options");
        assert!(options.skip_delivery);
        assert_eq!(options.backends, BackendSelection::Both);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let cli = parse(&["mailprobe-cli", "--provider", "fax"]);
        assert!(cli.test_options().is_err());
    }

    #[test]
    fn smtp_flags_become_overrides() {
        let cli = parse(&["mailprobe-cli", "--smtp-host", "mx.local", "--smtp-secure"]);
        let overrides = cli.smtp.overrides();
        assert_eq!(overrides.host.as_deref(), Some("mx.local"));
        assert_eq!(overrides.secure, Some(true));
        assert!(parse(&["mailprobe-cli"]).smtp.overrides().is_empty());
    }

    #[test]
    fn send_requires_recipient_and_subject() {
        assert!(<Cli as Parser>::try_parse_from(["mailprobe-cli", "send", "--subject", "x"]).is_err());
        let cli = parse(&[
            "mailprobe-cli",
            "send",
            "--to",
            "bob@example.com",
            "--subject",
            "Hi",
            "--provider",
            "smtp",
        ]);
        let Some(Commands::Send(send)) = cli.cmd else {
            panic!("expected send subcommand");
        };
        assert_eq!(send.backend().expect("provider"), Some(BackendKind::Smtp));
    }

    #[test]
    fn command_is_well_formed() {
        Cli::clap_command().debug_assert();
    }
}
