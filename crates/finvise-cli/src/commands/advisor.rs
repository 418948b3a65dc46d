//! AI advisor commands (insights, chat, ai-test)

use std::io::Write;

use anyhow::Result;
use finvise_core::{
    AdviceSession, AdvisorBackend, AdvisorClient, AppConfig, ChatOutcome, ChatSession, Impact,
    StateStore,
};

pub async fn cmd_insights<B: AdvisorBackend>(
    config: &AppConfig,
    store: &StateStore,
    backend: B,
) -> Result<()> {
    println!("🤖 Asking {} for insights...", backend.model());

    let session = AdviceSession::new(backend)
        .with_sample(config.advice.transaction_sample)
        .with_debounce(config.advice.debounce());

    let insights = session
        .refresh_if_changed(store.version(), store.state())
        .await
        .unwrap_or_default();
    tracing::info!(count = insights.len(), model = session.backend().model(), "Insights received");

    if insights.is_empty() {
        println!("   No insights available right now. Try again later.");
        return Ok(());
    }

    println!();
    for insight in &insights {
        let badge = match insight.impact {
            Impact::High => "🔴 high",
            Impact::Medium => "🟡 medium",
            Impact::Low => "🟢 low",
        };
        println!("  {} ({})", insight.title, badge);
        println!("     {}", insight.advice);
        println!();
    }

    Ok(())
}

/// Ask one question, printing the reply as it streams. Ctrl-C stops the
/// stream early.
pub async fn cmd_chat<B: AdvisorBackend + ?Sized>(
    config: &AppConfig,
    backend: &B,
    message: &str,
) -> Result<ChatOutcome> {
    let mut session = ChatSession::new().with_error_message(&config.chat.error_message);

    let cancel = session.cancel_handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    println!();
    let mut stdout = std::io::stdout();
    let outcome = session
        .send_with(backend, message, |chunk| {
            print!("{}", chunk.text);
            stdout.flush().ok();
        })
        .await;
    ctrl_c.abort();
    let outcome = outcome?;
    println!();

    match outcome {
        ChatOutcome::Completed => tracing::info!(model = backend.model(), "Chat reply received"),
        ChatOutcome::Failed => {
            if let Some(reply) = session.messages().last() {
                println!("{}", reply.content);
            }
        }
        ChatOutcome::Cancelled => println!("(stopped)"),
    }

    if let Some(reply) = session.messages().last() {
        if !reply.sources.is_empty() {
            println!();
            println!("Sources:");
            for (i, source) in reply.sources.iter().enumerate() {
                println!("  [{}] {} - {}", i + 1, source.title, source.uri);
            }
        }
    }

    Ok(outcome)
}

pub async fn cmd_ai_test() -> Result<()> {
    println!("🔍 Testing advisory backend...\n");

    let Some(client) = AdvisorClient::from_env() else {
        println!("  ⚠️  No backend configured");
        println!("\nTo set up Ollama:");
        println!("  1. Install Ollama: https://ollama.ai/download");
        println!("  2. Start the server: ollama serve");
        println!("  3. Pull a model: ollama pull llama3.2");
        println!("  4. Set environment variable: export OLLAMA_HOST=http://localhost:11434");
        println!("\nOr point OPENAI_COMPATIBLE_HOST at any OpenAI-compatible server");
        println!("with AI_BACKEND=openai_compatible.");
        return Ok(());
    };

    let info = client.info();
    println!("  Backend: {}", info.kind);
    println!("  Host:    {}", info.host);
    println!("  Model:   {}\n", info.model);

    print!("  Health check... ");
    std::io::stdout().flush().ok();
    if client.health_check().await {
        println!("✅ Connected");
    } else {
        println!("❌ Failed");
        println!("\n⚠️  Could not reach {}", info.host);
        return Ok(());
    }

    println!("\n💬 Testing chat stream...");
    let outcome = cmd_chat(
        &AppConfig::default(),
        &client,
        "In one sentence, what is an emergency fund?",
    )
    .await?;

    match outcome {
        ChatOutcome::Completed => println!("\n✅ Advisory backend is working"),
        ChatOutcome::Failed => println!("\n❌ Chat stream failed (run with --verbose for details)"),
        ChatOutcome::Cancelled => {}
    }

    Ok(())
}
