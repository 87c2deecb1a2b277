//! Interactive terminal quiz driven by the session signal scheduler.

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use services::{
    AppServices, CardOverlay, QuizRequest, SessionError, SessionView, SignalOutcome,
    SignalScheduler,
};
use trivia_core::model::UserId;

/// Ticks between countdown lines.
const COUNTDOWN_EVERY_TICKS: u32 = 50;

pub async fn run(
    services: &AppServices,
    user: UserId,
    request: QuizRequest,
) -> Result<(), Box<dyn std::error::Error>> {
    let quiz_loop = services.quiz_loop();
    let mut session = match quiz_loop.start_session(user, request).await {
        Ok(session) => session,
        Err(SessionError::Empty) => {
            println!("No questions available for this selection.");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let (scheduler, mut signals) = SignalScheduler::new(session.id());
    scheduler.start_ticker(quiz_loop.settings().tick_interval());
    print_question(&session.view());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while !session.is_complete() {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!(session_id = %session.id(), "stdin closed; abandoning session");
                    break;
                };
                let input = line.trim();
                if input.eq_ignore_ascii_case("q") {
                    println!("Quiz abandoned.");
                    break;
                }

                if !session.is_answered() {
                    let view = session.view();
                    let Some(option) = pick_option(&view, input) else {
                        println!("Type an option number, or q to quit.");
                        continue;
                    };
                    let answered = quiz_loop.answer_current(&mut session, &option).await?;
                    scheduler.schedule_card_follow_ups(&answered.result.cards, quiz_loop.settings());
                    print_reveal(&session.view());
                } else if session.discipline().is_sent_off() {
                    println!("The referee is reaching for the whistle...");
                } else {
                    quiz_loop.next_question(&mut session).await?;
                    if !session.is_complete() {
                        print_question(&session.view());
                    }
                }
            }
            Some(signal) = signals.recv() => {
                match quiz_loop.on_signal(&mut session, &signal).await {
                    SignalOutcome::Ticked => {
                        let remaining = session.timer().remaining_ticks();
                        if session.timer().is_active() && remaining % COUNTDOWN_EVERY_TICKS == 0 {
                            println!("  {:.1}s left", session.view().time_remaining_secs);
                        }
                    }
                    SignalOutcome::TimedOut(_) => print_reveal(&session.view()),
                    SignalOutcome::OverlayHidden
                    | SignalOutcome::Ended
                    | SignalOutcome::Ignored => {}
                }
            }
        }
    }

    scheduler.cancel();
    if let Some(summary) = session.view().summary {
        println!();
        println!("Full time!");
        println!("  Score:          {}", summary.score);
        println!(
            "  Correct:        {}/{}",
            summary.correct_answers, summary.total_questions
        );
        println!("  Longest streak: {}", summary.longest_streak);
        if summary.red_card {
            println!("  Sent off with a red card.");
        }
    }
    Ok(())
}

fn pick_option(view: &SessionView, input: &str) -> Option<String> {
    let question = view.question.as_ref()?;
    let index: usize = input.parse().ok()?;
    question.options.get(index.checked_sub(1)?).cloned()
}

fn print_question(view: &SessionView) {
    let Some(question) = &view.question else {
        return;
    };
    println!();
    println!(
        "Question {}/{}  |  score {}  |  streak {}{}",
        view.question_number,
        view.total_questions,
        view.score,
        view.streak,
        if view.yellow_badge { "  |  [YELLOW]" } else { "" }
    );
    println!("{}", question.text);
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}. {option}", i + 1);
    }
    println!("  ({:.1}s)", view.time_remaining_secs);
}

fn print_reveal(view: &SessionView) {
    let Some(question) = &view.question else {
        return;
    };
    let answer = question.correct_answer.as_deref().unwrap_or("?");

    if view.timed_out {
        println!("Time's up! The correct answer was: {answer}");
    } else if question.selected.as_deref() == Some(answer) {
        println!("Correct! +{}", view.last_points.unwrap_or(0));
    } else {
        println!("Wrong. The correct answer was: {answer}");
    }

    match view.overlay {
        Some(CardOverlay::Yellow) => println!("YELLOW CARD: three wrong in a row."),
        Some(CardOverlay::Red) => println!("RED CARD! You're off."),
        None => {}
    }
    if view.overlay != Some(CardOverlay::Red) {
        println!("Press Enter for the next question.");
    }
}
