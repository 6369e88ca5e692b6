use std::error::Error;
use std::time::Duration;

use quiz_core::model::{AccountDraft, AccountMode, ChatTranscript, ChoiceSet, Subject};
use quiz_core::puzzle::{FlipOutcome, MatchPuzzle, TileId};
use quiz_core::{QuizMode, TickOutcome};
use services::{AppServices, ChatError, ChatService, QuizRun};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Pause after an answer so the correct/incorrect marker is readable.
const HIGHLIGHT: Duration = Duration::from_millis(400);

const CHOICE_LABELS: [char; 4] = ['a', 'b', 'c', 'd'];

type CliResult = Result<(), Box<dyn Error>>;

fn stdin_lines() -> Lines<BufReader<Stdin>> {
    BufReader::new(tokio::io::stdin()).lines()
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

pub async fn quiz(services: &AppServices, subject: Subject, mode: QuizMode) -> CliResult {
    let quiz = services.quiz();
    let mut run = quiz.start(subject, mode)?;
    let mut lines = stdin_lines();

    println!("{} Quiz", subject.title());
    if let Some(seconds) = mode.time_limit() {
        println!("You have {seconds}s. Answer with a letter or the number itself.");
    }
    print_question(&run);

    while !run.is_ended() {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    run.cancel_countdown();
                    println!("Quiz abandoned; score not saved.");
                    return Ok(());
                };
                let Some(selected) = run.session().choices().and_then(|c| parse_choice(c, &line)) else {
                    println!("Pick one of a, b, c, d.");
                    continue;
                };
                let outcome = quiz.submit_answer(&mut run, selected).await?;
                if outcome.is_correct {
                    println!("✓ {} = {}", outcome.question.prompt(), outcome.selected);
                } else {
                    println!(
                        "✗ {} = {} (you picked {})",
                        outcome.question.prompt(),
                        outcome.question.answer(),
                        outcome.selected
                    );
                }
                if !outcome.ended {
                    tokio::time::sleep(HIGHLIGHT).await;
                    print_question(&run);
                }
            }
            () = run.next_tick() => {
                match quiz.tick(&mut run).await? {
                    TickOutcome::Expired => println!("Time's up!"),
                    TickOutcome::Running { remaining_seconds }
                        if remaining_seconds % 10 == 0 || remaining_seconds <= 5 =>
                    {
                        println!("{remaining_seconds}s left");
                    }
                    TickOutcome::Running { .. } => {}
                }
            }
        }
    }

    print_result(&run)
}

fn print_question(run: &QuizRun) {
    let session = run.session();
    let (Some(question), Some(choices)) = (session.current_question(), session.choices()) else {
        return;
    };
    println!();
    println!(
        "Question {}/{}: {} = ?",
        session.current_index() + 1,
        session.questions().len(),
        question.prompt()
    );
    let options: Vec<String> = CHOICE_LABELS
        .iter()
        .zip(choices.iter())
        .map(|(label, value)| format!("{label}) {value}"))
        .collect();
    println!("  {}", options.join("   "));
}

/// Accept either a choice letter or one of the displayed values.
fn parse_choice(choices: &ChoiceSet, input: &str) -> Option<i32> {
    let input = input.trim().to_ascii_lowercase();
    let mut chars = input.chars();
    if let (Some(letter), None) = (chars.next(), chars.next()) {
        if let Some(index) = CHOICE_LABELS.iter().position(|l| *l == letter) {
            return choices.get(index);
        }
    }
    input
        .parse::<i32>()
        .ok()
        .filter(|value| choices.contains(*value))
}

fn print_result(run: &QuizRun) -> CliResult {
    let Some(summary) = run.share_summary() else {
        return Ok(());
    };
    println!();
    println!("{summary}");
    if run.persisted() == Some(false) {
        println!("(score could not be saved)");
    }
    println!("Share: {}", summary.intent_url()?);
    Ok(())
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

pub async fn progress(services: &AppServices) -> CliResult {
    for entry in services.progress().load_all().await? {
        match entry.record {
            Some(record) => println!(
                "{:<15} {}/{} ({}%)",
                entry.subject.title(),
                record.score(),
                record.total(),
                record.percent()
            ),
            None => println!("{:<15} not played yet", entry.subject.title()),
        }
    }
    Ok(())
}

//
// ─── PUZZLE ────────────────────────────────────────────────────────────────────
//

pub async fn puzzle() -> CliResult {
    let mut puzzle = MatchPuzzle::standard();
    let mut lines = stdin_lines();
    println!("Match each problem with its answer. Enter a tile number, or 'reset'.");

    while !puzzle.is_solved() {
        print_board(&puzzle);
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("reset") {
            puzzle.reset();
            continue;
        }
        let Some(id) = line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| puzzle.tiles().get(index))
            .map(|tile| tile.id())
        else {
            println!("Enter a number between 1 and {}.", puzzle.tiles().len());
            continue;
        };

        match puzzle.flip(id)? {
            FlipOutcome::Ignored => println!("That tile is already showing."),
            FlipOutcome::Revealed(_) => {}
            FlipOutcome::Matched(a, b) => {
                println!("Match! {} = {}", tile_label(&puzzle, a), tile_label(&puzzle, b));
            }
            FlipOutcome::Mismatched(a, b) => {
                println!(
                    "No match: {} / {}",
                    tile_label(&puzzle, a),
                    tile_label(&puzzle, b)
                );
            }
        }
    }

    println!("Solved in {} attempts.", puzzle.attempts());
    Ok(())
}

fn tile_label(puzzle: &MatchPuzzle, id: TileId) -> &str {
    puzzle.tile(id).map_or("?", |tile| tile.label())
}

fn print_board(puzzle: &MatchPuzzle) {
    for (row, tiles) in puzzle.tiles().chunks(4).enumerate() {
        let cells: Vec<String> = tiles
            .iter()
            .enumerate()
            .map(|(col, tile)| {
                let number = row * 4 + col + 1;
                if puzzle.is_face_up(tile.id()) {
                    format!("{number:>2}:{:<6}", tile.label())
                } else {
                    format!("{number:>2}:{:<6}", "??")
                }
            })
            .collect();
        println!("{}", cells.join(" "));
    }
}

//
// ─── CHAT ──────────────────────────────────────────────────────────────────────
//

pub async fn chat(chat: &ChatService) -> CliResult {
    let mut transcript = ChatTranscript::new();
    let mut lines = stdin_lines();
    println!("Ask the math helper anything ({}). Type 'quit' to leave.", chat.endpoint());

    while let Some(line) = lines.next_line().await? {
        if line.trim().eq_ignore_ascii_case("quit") {
            break;
        }
        match chat.send(&mut transcript, &line).await {
            Ok(reply) => println!("{}", reply.content),
            Err(ChatError::EmptyInput) => {}
            Err(err) => println!("Sorry, something went wrong: {err}"),
        }
    }
    Ok(())
}

//
// ─── ACCOUNT ───────────────────────────────────────────────────────────────────
//

pub fn account(draft: AccountDraft) -> CliResult {
    let mode = draft.mode;
    let account = draft.validate()?;
    match mode {
        AccountMode::Login => println!("Welcome back, {}!", account.username()),
        AccountMode::Create => println!(
            "Account created for {} <{}>.",
            account.username(),
            account.email()
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_and_values_select_choices() {
        let choices = ChoiceSet::new([4, 9, 1, 12]).unwrap();
        assert_eq!(parse_choice(&choices, "b"), Some(9));
        assert_eq!(parse_choice(&choices, " D "), Some(12));
        assert_eq!(parse_choice(&choices, "1"), Some(1));
        assert_eq!(parse_choice(&choices, "7"), None);
        assert_eq!(parse_choice(&choices, "e"), None);
        assert_eq!(parse_choice(&choices, ""), None);
    }
}
