//! The `gnosis init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("gnosis.toml").exists() {
        println!("gnosis.toml already exists, skipping.");
    } else {
        std::fs::write("gnosis.toml", SAMPLE_CONFIG)?;
        println!("Created gnosis.toml");
    }

    std::fs::create_dir_all("quizzes")?;
    let example_path = std::path::Path::new("quizzes/example.json");
    if example_path.exists() {
        println!("quizzes/example.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.json");
    }

    println!("\nNext steps:");
    println!("  1. Run: gnosis validate --result quizzes/example.json");
    println!("  2. Run: gnosis take --result quizzes/example.json");
    println!("  3. Run: gnosis generate --mode quiz --topic \"Data Structures\" --output quizzes/new.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gnosis configuration

# Generation API. GNOSIS_API_BASE overrides this value.
api_base = "https://gnosis-gen-production.up.railway.app"
timeout_secs = 120

[evaluator]
# "first_significant_word" accepts a short answer whose first word is a key
# term of the reference answer; "exact_match" requires the whole answer.
policy = "first_significant_word"
min_significant_len = 3
"#;

const EXAMPLE_QUIZ: &str = r#"{
  "mode": "quiz",
  "quiz": {
    "mcq": [
      {
        "question": "Which data structure stores elements in nodes linked by pointers?",
        "options": ["Array", "Linked List", "Hash Table", "Binary Heap"],
        "correct_answer": "B"
      },
      {
        "question": "Which operation removes the top element of a stack?",
        "options": ["Push", "Pop", "Peek", "Enqueue"],
        "correct_answer": "Pop"
      }
    ],
    "short_answer": [
      {
        "question": "A stack follows ____ order.",
        "correct_answer": "LIFO"
      },
      {
        "question": "Which operation adds an element to the top of a stack?",
        "correct_answer": "The push operation"
      }
    ]
  }
}
"#;
