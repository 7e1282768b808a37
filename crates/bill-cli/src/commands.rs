use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use bill_crypto::{CanonicalHasher, ProvenanceSigner, SignerConfig, VerifyingKey};
use bill_gateway::{GatewayConfig, GatewayServer};
use bill_ledger::InMemoryLedger;
use bill_protocol::{extract_json_object, ScanNotification, TagCheck, TagVerdict, TextRecordCodec};
use bill_relay::{RelayClient, RelayConfig};
use bill_scan::{parse_extractor_response, ScanOrchestrator, ScanOutcome, WriterTransport};
use bill_types::{normalize_currency, normalize_serial, LookupResult, TreasuryPayload};
use colored::Colorize;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let json = matches!(cli.format, OutputFormat::Json);
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Hash(args) => cmd_hash(args, json),
        Command::Sign(args) => {
            let relay = relay_config(cli.relay, cli.relay_config)?;
            cmd_sign(args, relay, json).await
        }
        Command::VerifyTag(args) => cmd_verify_tag(args, json),
        Command::Lookup(args) => {
            let relay = relay_config(cli.relay, cli.relay_config)?;
            cmd_lookup(args, relay, json).await
        }
        Command::Register(args) => {
            let relay = relay_config(cli.relay, cli.relay_config)?;
            cmd_register(args, relay, json).await
        }
        Command::Scan(args) => {
            let relay = relay_config(cli.relay, cli.relay_config)?;
            cmd_scan(args, relay).await
        }
    }
}

fn relay_config(
    url: Option<String>,
    path: Option<std::path::PathBuf>,
) -> anyhow::Result<RelayConfig> {
    let mut config = match path {
        Some(path) => RelayConfig::load(&path)
            .with_context(|| format!("reading relay config {}", path.display()))?,
        None => RelayConfig::default(),
    };
    if let Some(url) = url {
        config.base_url = url;
    }
    Ok(config)
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => GatewayConfig::load(path)
            .with_context(|| format!("reading gateway config {}", path.display()))?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if args.no_cors {
        config.enable_cors = false;
    }

    println!("{} relay gateway on {}", "▶".green().bold(), config.bind_addr.to_string().bold());
    println!("  GET  /health");
    println!("  POST /register   {{serial,currency,value,pubkeyB64?}}");
    println!("  GET  /bill/:serial");
    println!("  GET  /bill?serial=...");

    let ledger = Arc::new(InMemoryLedger::new(config.ledger.clone()));
    GatewayServer::new(config, ledger).serve().await?;
    Ok(())
}

fn cmd_hash(args: BillArgs, json: bool) -> anyhow::Result<()> {
    let serial = normalize_serial(&args.serial);
    let currency = normalize_currency(&args.currency);
    let message = CanonicalHasher::canonical_message(&serial, &currency, args.value);
    let hash = CanonicalHasher::compute_hash(&message);

    if json {
        println!("{}", json!({ "message": message, "billHash": hash.to_hex() }));
    } else {
        println!("Message: {}", message.cyan());
        println!("Hash:    {}", hash.to_hex().yellow());
    }
    Ok(())
}

async fn cmd_sign(args: SignArgs, relay: RelayConfig, json: bool) -> anyhow::Result<()> {
    let config = SignerConfig {
        key_path: args.key.key_file.clone(),
        seed_hex: args.key.seed_hex.clone(),
    };
    let signer = ProvenanceSigner::from_config(&config)?;
    let signed = signer.sign(&args.bill.serial, &args.bill.currency, args.bill.value);

    if let Some(path) = &args.record {
        let bytes = TextRecordCodec::encode_payload(&signed.payload)?;
        std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    }

    if json {
        println!(
            "{}",
            json!({ "payload": signed.payload, "publicKey": signed.public_key })
        );
    } else {
        println!("{} Signed {}", "✓".green().bold(), signed.payload.serial().yellow());
        println!("  Public key: {}", signed.public_key.cyan());
        println!("  Signature:  {}", signed.payload.signature().dimmed());
        if let Some(path) = &args.record {
            println!("  Record:     {}", path.display());
        }
    }

    // Signing stands on its own; a failed registration does not undo it.
    if args.register {
        let client = RelayClient::new(relay)?;
        match client
            .register_bill(
                signed.payload.serial(),
                signed.payload.currency(),
                signed.payload.value(),
                Some(&signed.public_key),
            )
            .await
        {
            Ok(outcome) => print_registration(&outcome, json),
            Err(e) => eprintln!("{} Registration failed: {e}", "✗".red().bold()),
        }
    }
    Ok(())
}

fn cmd_verify_tag(args: VerifyTagArgs, json: bool) -> anyhow::Result<()> {
    let raw = std::fs::read(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    let payload: TreasuryPayload = match TextRecordCodec::decode_payload(&raw) {
        Ok(payload) => payload,
        Err(_) => {
            let text = extract_json_object(&raw).ok_or_else(|| anyhow!("no JSON found on tag"))?;
            serde_json::from_str(&text).context("decoding tag payload")?
        }
    };
    let key = VerifyingKey::from_hex(&args.pubkey).map_err(|e| anyhow!("public key: {e}"))?;

    let expected = match args.expect.as_deref() {
        Some([serial, currency, denomination]) => Some(ScanNotification {
            serial: normalize_serial(serial),
            currency: normalize_currency(currency),
            denomination: denomination.parse().context("denomination")?,
            blockchain_check: false,
        }),
        Some(_) => bail!("--expect takes SERIAL CURRENCY DENOMINATION"),
        None => None,
    };

    let verdict = match expected {
        Some(expected) => TagCheck::verify(&key, Some(&expected), &payload),
        None => TagCheck::verify_signature(&key, &payload),
    };

    if json {
        let (ok, reason) = match &verdict {
            TagVerdict::Verified => (true, None),
            TagVerdict::Mismatch { reason } => (false, Some(reason.clone())),
            TagVerdict::InvalidSignature => (false, Some("Invalid signature".to_string())),
        };
        println!("{}", json!({ "ok": ok, "serial": payload.serial(), "reason": reason }));
    } else {
        match &verdict {
            TagVerdict::Verified => println!(
                "{} {} {} {}",
                "✓ VERIFIED".green().bold(),
                payload.serial(),
                payload.currency(),
                payload.value()
            ),
            TagVerdict::Mismatch { reason } => println!("{} {}", "✗".red().bold(), reason),
            TagVerdict::InvalidSignature => println!("{} Invalid signature", "✗".red().bold()),
        }
    }

    if !verdict.is_verified() {
        std::process::exit(1);
    }
    Ok(())
}

async fn cmd_lookup(args: LookupArgs, relay: RelayConfig, json: bool) -> anyhow::Result<()> {
    let client = RelayClient::new(relay)?;
    let serial = normalize_serial(&args.serial);
    let result = client.lookup(&serial).await;

    if json {
        let value = match &result {
            LookupResult::Issued { hash, issued_at } => {
                json!({ "ok": true, "issued": true, "serial": serial, "billHash": hash, "issuedAt": issued_at })
            }
            LookupResult::NotIssued => json!({ "ok": true, "issued": false, "serial": serial }),
            LookupResult::Failed { message } => json!({ "ok": false, "error": message }),
        };
        println!("{value}");
        return Ok(());
    }

    match result {
        LookupResult::Issued { hash, issued_at } => {
            println!("{} {} is issued", "✓".green().bold(), serial.yellow());
            println!("  Hash:      {}", hash.cyan());
            println!("  Issued at: {issued_at}");
        }
        LookupResult::NotIssued => println!("{} {} is not issued", "○".dimmed(), serial.yellow()),
        LookupResult::Failed { message } => bail!("lookup failed: {message}"),
    }
    Ok(())
}

async fn cmd_register(args: RegisterArgs, relay: RelayConfig, json: bool) -> anyhow::Result<()> {
    let client = RelayClient::new(relay)?;
    let outcome = client
        .register_bill(
            &normalize_serial(&args.bill.serial),
            &normalize_currency(&args.bill.currency),
            args.bill.value,
            args.pubkey.as_deref(),
        )
        .await?;
    print_registration(&outcome, json);
    Ok(())
}

fn print_registration(outcome: &bill_relay::RegisterOutcome, json: bool) {
    if json {
        println!(
            "{}",
            json!({
                "ok": true,
                "already": outcome.already,
                "billHash": outcome.bill_hash,
                "issuedAt": outcome.issued_at,
                "txHash": outcome.tx_hash,
                "blockNumber": outcome.block_number,
            })
        );
        return;
    }

    if outcome.already {
        println!("{} Already registered", "✓".green().bold());
    } else {
        println!("{} Registered on ledger", "✓".green().bold());
    }
    println!("  Hash: {}", outcome.bill_hash.cyan());
    if let Some(tx) = &outcome.tx_hash {
        println!("  Tx:   {}", tx.dimmed());
    }
    if let Some(block) = outcome.block_number {
        println!("  Block: {block}");
    }
}

async fn cmd_scan(args: ScanArgs, relay: RelayConfig) -> anyhow::Result<()> {
    let client = RelayClient::new(relay)?;
    let orchestrator = ScanOrchestrator::new(
        Arc::new(client),
        Arc::new(WriterTransport::new(tokio::io::stdout())),
    );
    orchestrator.set_blockchain_check(!args.no_blockchain_check);
    if args.test_scan {
        orchestrator.send_test_scan()?;
    }

    let mut lookups = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let fields = match parse_extractor_response(&line) {
            Ok(fields) => fields,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable extractor reply");
                continue;
            }
        };
        match orchestrator.on_extraction(&fields) {
            ScanOutcome::Dispatched {
                lookup: Some(handle),
                ..
            } => lookups.push(handle),
            ScanOutcome::Rejected(reason) => tracing::info!(reason = %reason, "extraction rejected"),
            _ => {}
        }
    }

    for handle in lookups {
        let _ = handle.await;
    }
    orchestrator.flush().await?;
    Ok(())
}
