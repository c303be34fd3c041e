//! Command-line front end: argument parsing plus the terminal renditions of
//! the quiz, authoring, upload and chat pages.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use quizdesk::chat::ChatSession;
use quizdesk::draft::QuizDraft;
use quizdesk::protocol::{Profile, QuizWire, Registration};
use quizdesk::util::parse_choice;
use quizdesk::{ApiClient, AuthContext, ClientConfig, ClientError, Correctness, PdfFile, Quiz, QuizView, SubmitOutcome};

#[derive(Parser, Debug)]
#[command(name = "quizdesk", version, about = "Take quizzes and chat with your PDFs from the terminal")]
pub struct Cli {
  /// Session token printed by `quizdesk login`
  #[arg(long, env = "QUIZDESK_TOKEN", global = true, hide_env_values = true)]
  pub token: Option<String>,

  /// Collaborator base URL (overrides config and QUIZDESK_BASE_URL)
  #[arg(long, global = true)]
  pub base_url: Option<String>,

  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Create an account
  Register(RegisterArgs),
  /// Log in and print the session token
  Login(LoginArgs),
  /// End the session
  Logout,
  /// List your quizzes
  Quizzes,
  /// Answer a quiz interactively and see the graded result
  Take { quiz_name: String },
  /// Show your past attempts for a quiz
  History { quiz_name: String },
  /// Create a quiz from a JSON file ({"quiz_name", "questions": [...]})
  Create {
    #[arg(long)]
    file: PathBuf,
  },
  /// Replace the questions of a quiz from a JSON file
  Update {
    quiz_name: String,
    #[arg(long)]
    file: PathBuf,
  },
  /// Delete a quiz
  Delete { quiz_name: String },
  /// Upload a PDF and generate a quiz from it
  Upload { pdf: PathBuf },
  /// Chat about your PDFs; one query per line on stdin
  Chat {
    /// Restrict answers to this PDF
    #[arg(long)]
    pdf: Option<String>,
  },
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
  #[arg(long)]
  pub username: String,
  #[arg(long, env = "QUIZDESK_PASSWORD", hide_env_values = true)]
  pub password: String,
  #[arg(long)]
  pub email: String,
  #[arg(long, default_value = "")]
  pub birthday: String,
  #[arg(long, default_value = "")]
  pub phone: String,
  #[arg(long, default_value = "")]
  pub address: String,
}

impl From<RegisterArgs> for Registration {
  fn from(a: RegisterArgs) -> Self {
    Registration {
      username: a.username,
      password: a.password,
      profile: Profile { email: a.email, birthday: a.birthday, phone: a.phone, address: a.address },
    }
  }
}

#[derive(Args, Debug)]
pub struct LoginArgs {
  #[arg(long)]
  pub username: String,
  #[arg(long, env = "QUIZDESK_PASSWORD", hide_env_values = true)]
  pub password: String,
}

/// Show the user-facing message first, transport detail as the cause.
fn user_facing(e: ClientError) -> anyhow::Error {
  let msg = e.user_message();
  anyhow::Error::new(e).context(msg)
}

impl Cli {
  pub async fn run(self) -> Result<()> {
    let mut cfg = ClientConfig::from_env();
    if let Some(url) = self.base_url {
      cfg.base_url = url;
    }
    let api = ApiClient::new(&cfg).map_err(user_facing)?;
    let mut auth = self.token.map(AuthContext::with_token).unwrap_or_default();

    match self.command {
      Commands::Register(args) => {
        let msg = api.register(&args.into()).await.map_err(user_facing)?;
        println!("{}", if msg.is_empty() { "Registered. You can log in now." } else { msg.as_str() });
      }
      Commands::Login(args) => {
        let session = api.login(&args.username, &args.password).await.map_err(user_facing)?;
        println!("{}", session.token().unwrap_or_default());
      }
      Commands::Logout => {
        api.logout(&mut auth).await.map_err(user_facing)?;
        println!("Logged out. Unset QUIZDESK_TOKEN to forget the token.");
      }
      Commands::Quizzes => {
        let quizzes = api.list_quizzes(&auth).await.map_err(user_facing)?;
        if quizzes.is_empty() {
          println!("No quizzes yet.");
        }
        for q in quizzes {
          println!("{}  ({} questions)", q.name, q.questions.len());
        }
      }
      Commands::Take { quiz_name } => take_quiz(api, &auth, quiz_name).await?,
      Commands::History { quiz_name } => {
        let records = api.quiz_history(&auth, &quiz_name).await.map_err(user_facing)?;
        if records.is_empty() {
          println!("No attempts for {} yet.", quiz_name);
        }
        for (i, r) in records.iter().enumerate() {
          println!("#{}  {}  score {}  answers [{}]", i + 1, r.username, r.score, r.answers.join(", "));
        }
      }
      Commands::Create { file } => {
        let quiz = read_quiz_file(&file).await?;
        let created = api.create_quiz(&auth, &quiz).await.map_err(user_facing)?;
        println!("Created quiz {} with {} questions.", created.name, created.questions.len());
      }
      Commands::Update { quiz_name, file } => {
        let quiz = read_quiz_file(&file).await?;
        let updated = api.update_quiz(&auth, &quiz_name, &quiz).await.map_err(user_facing)?;
        println!("Updated quiz {} ({} questions).", updated.name, updated.questions.len());
      }
      Commands::Delete { quiz_name } => {
        let msg = api.delete_quiz(&auth, &quiz_name).await.map_err(user_facing)?;
        println!("{}", if msg.is_empty() { format!("Deleted {}.", quiz_name) } else { msg });
      }
      Commands::Upload { pdf } => {
        let file = PdfFile::read(&pdf).await.map_err(user_facing)?;
        let csv = api.generate_quiz_from_pdf(&auth, &file).await.map_err(user_facing)?;
        println!("Uploaded {} and generated a quiz ({}).", file.filename, csv);
      }
      Commands::Chat { pdf } => chat_loop(&api, &auth, pdf).await?,
    }
    Ok(())
  }
}

/// Parse a JSON quiz file and run it through the authoring checks.
async fn read_quiz_file(path: &Path) -> Result<Quiz> {
  let raw = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("cannot read {}", path.display()))?;
  let wire: QuizWire = serde_json::from_str(&raw).with_context(|| format!("{} is not a quiz JSON file", path.display()))?;
  QuizDraft::from_quiz(&Quiz::from(wire)).validate().map_err(user_facing)
}

fn prompt(text: &str) -> Result<()> {
  print!("{}", text);
  std::io::stdout().flush()?;
  Ok(())
}

async fn take_quiz(api: ApiClient, auth: &AuthContext, quiz_name: String) -> Result<()> {
  let mut view = QuizView::mount(api, quiz_name);
  view.load(auth).await.map_err(user_facing)?;
  let quiz = view.quiz().cloned().context("quiz vanished after loading")?;

  println!("{}\n", quiz.name);
  let mut lines = BufReader::new(tokio::io::stdin()).lines();

  'questions: for (qi, q) in quiz.questions.iter().enumerate() {
    println!("Question {}. {}", qi + 1, q.prompt);
    for (oi, opt) in q.options.iter().enumerate() {
      println!("  {}) {}", oi + 1, opt);
    }
    loop {
      prompt(&format!("Your choice (1-{}, blank to skip): ", q.options.len()))?;
      let Some(line) = lines.next_line().await? else {
        println!();
        break 'questions;
      };
      if line.trim().is_empty() {
        break;
      }
      match parse_choice(&line, q.options.len()) {
        Some(oi) => {
          view.select_answer(qi, &q.options[oi], oi);
          break;
        }
        None => println!("Please enter a number between 1 and {}.", q.options.len()),
      }
    }
    println!();
  }

  loop {
    match view.submit(auth).await {
      SubmitOutcome::Applied => break,
      SubmitOutcome::Failed(e) => {
        eprintln!("{}", e.user_message());
        prompt("Submit again? [y/N]: ")?;
        let again = lines.next_line().await?.unwrap_or_default();
        if !again.trim().eq_ignore_ascii_case("y") {
          return Err(user_facing(e));
        }
      }
      SubmitOutcome::Discarded => bail!("the submission no longer matches this quiz"),
    }
  }

  print_graded(&view, &quiz);
  Ok(())
}

fn print_graded(view: &QuizView<ApiClient>, quiz: &Quiz) {
  if let Some(r) = view.attempt().and_then(|a| a.result()) {
    println!("Result: {}/{}\n", r.score, r.total);
  }
  for (qi, q) in quiz.questions.iter().enumerate() {
    println!("Question {}. {}", qi + 1, q.prompt);
    for (oi, opt) in q.options.iter().enumerate() {
      let mark = match view.option_correctness(qi, oi) {
        Correctness::SelectedAndCorrect => "[✓]",
        Correctness::SelectedAndWrong => "[✗]",
        Correctness::Unknown => "[?]",
        Correctness::NotApplicable => "   ",
      };
      println!("  {} {}) {}", mark, oi + 1, opt);
    }
    match view.correct_answer_label(qi) {
      Some(label) => println!("  Correct answer: {}\n", label),
      None => println!("  Correct answer: unknown\n"),
    }
  }
}

async fn chat_loop(api: &ApiClient, auth: &AuthContext, pdf: Option<String>) -> Result<()> {
  let mut session = ChatSession::new();
  if let Err(e) = session.refresh_pdfs(api, auth).await {
    if matches!(e, ClientError::NotAuthenticated(_)) {
      return Err(user_facing(e));
    }
    eprintln!("Could not load your PDF list: {}", e.user_message());
  }
  if let Some(name) = pdf {
    if !session.select_pdf(&name) {
      warn!(target: "chat", %name, "PDF not in the chat list; asking across all PDFs");
      eprintln!("{} is not one of your chat PDFs; asking across all of them.", name);
    }
  }
  if !session.pdfs().is_empty() {
    println!("Your PDFs: {}", session.pdfs().join(", "));
  }
  println!("{}", quizdesk::chat::CHAT_GREETING);

  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  loop {
    prompt("> ")?;
    let Some(line) = lines.next_line().await? else {
      println!();
      break;
    };
    let sent = session.send(api, auth, &line).await.map(|m| m.map(|m| m.display_text().to_string()));
    match sent {
      Ok(Some(reply)) => println!("{}\n", reply),
      Ok(None) => {}
      Err(e) => {
        if let Some(last) = session.messages().last() {
          println!("{}\n", last.display_text());
        }
        if matches!(e, ClientError::NotAuthenticated(_)) {
          return Err(user_facing(e));
        }
      }
    }
  }
  Ok(())
}
