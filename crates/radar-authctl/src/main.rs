// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! radar-authctl: operator tooling for RADAR tokens.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use radar_auth::{check, Permission, RoleAssignment, Target, CLIENT_CREDENTIALS};
use radar_auth_config::{load_config, load_config_with_file, AuthServiceConfig, LoggingConfig};
use radar_auth_keys::{KeyMaterialManager, SharedKeyMaterial};
use radar_auth_token::{
	GrantRequest, JwtClaims, SubjectProfile, TokenCodec, TokenIssuer, TracingAuditSink,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "radar-authctl", version, about, long_about = None)]
struct Cli {
	/// Configuration file (defaults to /etc/radar/auth.toml)
	#[arg(short, long, env = "RADAR_AUTH_CONFIG")]
	config: Option<PathBuf>,

	/// Emit logs as JSON
	#[arg(long)]
	json_logs: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print the published JSON Web Key Set
	Jwks,

	/// Grant an access and refresh token pair
	Mint {
		#[arg(long)]
		client_id: String,

		/// Subject identifier; omit together with --client-credentials
		#[arg(long, required_unless_present = "client_credentials")]
		subject: Option<String>,

		#[arg(long, requires = "subject")]
		user_name: Option<String>,

		/// Issue a client-credentials token with no subject
		#[arg(long, conflicts_with = "subject")]
		client_credentials: bool,

		#[arg(long, default_value = "authorization_code")]
		grant_type: String,

		/// Role claim, `ROLE` or `REFERENT:ROLE`
		#[arg(long = "role", value_name = "CLAIM")]
		roles: Vec<String>,

		#[arg(long = "authority")]
		authorities: Vec<String>,

		#[arg(long = "scope", value_name = "ENTITY.OPERATION")]
		scopes: Vec<String>,

		#[arg(long = "source")]
		sources: Vec<String>,
	},

	/// Verify an access or refresh token and print its claims
	Inspect { token: String },

	/// Evaluate a permission against an access token
	Check {
		token: String,

		#[arg(long, value_name = "ENTITY.OPERATION")]
		permission: String,

		#[arg(long)]
		organization: Option<String>,

		#[arg(long)]
		project: Option<String>,

		#[arg(long, requires = "project")]
		subject: Option<String>,

		#[arg(long, requires = "subject")]
		source: Option<String>,
	},
}

fn main() -> Result<ExitCode> {
	let cli = Cli::parse();

	let config = match &cli.config {
		Some(path) => load_config_with_file(path),
		None => load_config(),
	}
	.context("failed to load configuration")?;

	init_tracing(&config.logging, cli.json_logs);

	run(cli.command, &config)
}

fn init_tracing(logging: &LoggingConfig, json: bool) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

	if json {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().json().with_writer(std::io::stderr))
			.init();
	} else {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().with_writer(std::io::stderr))
			.init();
	}
}

fn run(command: Command, config: &AuthServiceConfig) -> Result<ExitCode> {
	let keys = KeyMaterialManager::from_config(config).context("failed to load key material")?;
	let codec = TokenCodec::new(SharedKeyMaterial::new(keys));

	match command {
		Command::Jwks => {
			let keys = codec.keys().current();
			println!("{}", serde_json::to_string_pretty(keys.jwks())?);
		}
		Command::Mint {
			client_id,
			subject,
			user_name,
			client_credentials,
			grant_type,
			roles,
			authorities,
			scopes,
			sources,
		} => {
			let profile = match subject {
				Some(subject) => {
					let username = user_name.unwrap_or_else(|| subject.clone());
					Some(subject_profile(subject, username, &roles, authorities, sources)?)
				}
				None => None,
			};
			let request = GrantRequest {
				client_id,
				grant_type: if client_credentials {
					CLIENT_CREDENTIALS.to_string()
				} else {
					grant_type
				},
				scopes,
			};

			let issuer = TokenIssuer::new(codec, config.token.clone(), Arc::new(TracingAuditSink));
			let granted = issuer.grant(&request, profile.as_ref())?;
			println!("{}", serde_json::to_string_pretty(&granted)?);
		}
		Command::Inspect { token } => {
			let claims = codec.decode(&token)?;
			println!("{}", serde_json::to_string_pretty(&JwtClaims::from_token(&claims)?)?);
		}
		Command::Check {
			token,
			permission,
			organization,
			project,
			subject,
			source,
		} => {
			let claims = codec.read_access_token(&token)?;
			let permission = Permission::from_scope(&permission)?;
			let target = target(
				organization.as_deref(),
				project.as_deref(),
				subject.as_deref(),
				source.as_deref(),
			)?;

			match check(&claims, permission, target) {
				Ok(()) => println!("granted"),
				Err(denied) => {
					println!("{denied}");
					return Ok(ExitCode::FAILURE);
				}
			}
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn subject_profile(
	subject: String,
	username: String,
	roles: &[String],
	authorities: Vec<String>,
	sources: Vec<String>,
) -> Result<SubjectProfile> {
	let mut profile = SubjectProfile::new(subject, username);
	for claim in roles {
		let assignment =
			RoleAssignment::parse_claim(claim).with_context(|| format!("invalid role claim {claim:?}"))?;
		profile = profile.with_role(assignment);
	}
	profile.authorities = authorities;
	profile.sources = sources;
	Ok(profile)
}

/// Builds the most specific target the given identifiers describe.
fn target<'a>(
	organization: Option<&'a str>,
	project: Option<&'a str>,
	subject: Option<&'a str>,
	source: Option<&'a str>,
) -> Result<Target<'a>> {
	Ok(match (organization, project, subject, source) {
		(None, None, None, None) => Target::Global,
		(Some(organization), None, None, None) => Target::Organization(organization),
		(None, Some(project), None, None) => Target::Project(project),
		(Some(organization), Some(project), None, None) => Target::OrganizationAndProject {
			organization,
			project,
		},
		(Some(_), _, Some(_), _) => bail!("--organization cannot be combined with --subject"),
		(None, Some(project), Some(subject), None) => Target::Subject { project, subject },
		(None, Some(project), Some(subject), Some(source)) => Target::Source {
			project,
			subject,
			source,
		},
		_ => bail!("--subject needs --project and --source needs --subject"),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;
	use radar_auth::Role;

	#[test]
	fn cli_definition_is_valid() {
		Cli::command().debug_assert();
	}

	mod parsing {
		use super::*;

		#[test]
		fn mint_collects_repeated_flags() {
			let cli = Cli::try_parse_from([
				"radar-authctl",
				"mint",
				"--client-id",
				"aRMT",
				"--subject",
				"sub-1",
				"--role",
				"proj-1:PARTICIPANT",
				"--scope",
				"SUBJECT.READ",
				"--scope",
				"MEASUREMENT.CREATE",
			])
			.unwrap();

			match cli.command {
				Command::Mint { scopes, roles, .. } => {
					assert_eq!(scopes, ["SUBJECT.READ", "MEASUREMENT.CREATE"]);
					assert_eq!(roles, ["proj-1:PARTICIPANT"]);
				}
				other => panic!("unexpected command: {other:?}"),
			}
		}

		#[test]
		fn mint_needs_subject_or_client_credentials() {
			assert!(Cli::try_parse_from(["radar-authctl", "mint", "--client-id", "c"]).is_err());
			assert!(Cli::try_parse_from([
				"radar-authctl",
				"mint",
				"--client-id",
				"c",
				"--client-credentials"
			])
			.is_ok());
		}

		#[test]
		fn check_source_requires_subject() {
			let result = Cli::try_parse_from([
				"radar-authctl",
				"check",
				"tok",
				"--permission",
				"SOURCE.READ",
				"--project",
				"p",
				"--source",
				"s",
			]);
			assert!(result.is_err());
		}
	}

	mod targets {
		use super::*;

		#[test]
		fn most_specific_target_wins() {
			assert_eq!(target(None, None, None, None).unwrap(), Target::Global);
			assert_eq!(target(Some("o"), None, None, None).unwrap(), Target::Organization("o"));
			assert_eq!(
				target(Some("o"), Some("p"), None, None).unwrap(),
				Target::OrganizationAndProject {
					organization: "o",
					project: "p"
				}
			);
			assert_eq!(
				target(None, Some("p"), Some("s"), Some("x")).unwrap(),
				Target::Source {
					project: "p",
					subject: "s",
					source: "x"
				}
			);
		}

		#[test]
		fn subject_without_project_is_rejected() {
			assert!(target(None, None, Some("s"), None).is_err());
		}

		#[test]
		fn organization_with_subject_is_rejected() {
			assert!(target(Some("o"), Some("p"), Some("s"), None).is_err());
			assert!(target(Some("o"), Some("p"), Some("s"), Some("x")).is_err());
		}
	}

	#[test]
	fn subject_profile_parses_role_claims() {
		let profile = subject_profile(
			"sub-1".into(),
			"alice".into(),
			&["proj-42:PROJECT_ANALYST".to_string(), "SYS_ADMIN".to_string()],
			vec![],
			vec!["src-1".into()],
		)
		.unwrap();
		assert_eq!(profile.roles[0], RoleAssignment::scoped(Role::ProjectAnalyst, "proj-42"));
		assert_eq!(profile.roles[1], RoleAssignment::global(Role::SysAdmin));
		assert_eq!(profile.sources, ["src-1"]);

		assert!(subject_profile("s".into(), "s".into(), &["p:NOPE".into()], vec![], vec![]).is_err());
	}
}
