//! Walk a scripted session through to the printed result

use synheart_screen::{ScreeningError, ScreeningSession};

fn main() {
    // Raw values for items 1-10
    let answers: [u8; 10] = [1, 2, 2, 3, 1, 2, 1, 2, 1, 0];

    let mut session = ScreeningSession::default();
    for (position, value) in answers.iter().enumerate() {
        let index = position as u8 + 1;
        if let Err(e) = session.answer(index, *value) {
            eprintln!("Error: {e}");
            return;
        }
        eprintln!(
            "answered {index}/10 ({:.0}%), crisis alert: {}",
            session.progress() * 100.0,
            session.crisis_alert()
        );
    }

    match session
        .finalize()
        .and_then(|result| result.to_json().map_err(ScreeningError::from))
    {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
