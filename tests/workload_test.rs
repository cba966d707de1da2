mod common;

use common::{strings, ImdbFixture};

use graphbench::sdk::GraphClient;
use graphbench::workload::queries::*;
use graphbench::{Parameters, ResultShape, WorkloadLibrary};

async fn run(fx: &ImdbFixture, traversal: graphbench::sdk::Traversal) -> Vec<String> {
    strings(fx.client.execute(&traversal).await.unwrap())
}

#[tokio::test]
async fn test_q1_known_titles_in_credit_order() {
    let fx = ImdbFixture::new().await;
    let p = fx.params();
    assert_eq!(run(&fx, q1(&p)).await, vec!["Alpha", "Beta", "Gamma"]);

    let nobody = Parameters {
        actor_id: fx.nia.to_string(),
        ..p
    };
    assert!(run(&fx, q1(&nobody)).await.is_empty());
}

#[tokio::test]
async fn test_q2_first_and_last() {
    let fx = ImdbFixture::new().await;
    let p = fx.params();
    assert_eq!(run(&fx, q2(&p)).await, vec!["Alpha", "Gamma"]);

    // One known title: reported once, not twice
    let single = Parameters {
        actor_id: fx.dan.to_string(),
        ..p.clone()
    };
    assert_eq!(run(&fx, q2(&single)).await, vec!["Delta"]);

    let none = Parameters {
        actor_id: fx.nia.to_string(),
        ..p
    };
    assert!(run(&fx, q2(&none)).await.is_empty());
}

#[tokio::test]
async fn test_q3_q4_directors() {
    let fx = ImdbFixture::new().await;
    let p = fx.params();
    // Cid has three credits overall, but only one inside 1980..=2001
    assert_eq!(run(&fx, q3(&p)).await, vec!["Cid"]);
    assert_eq!(run(&fx, q4(&p)).await, vec!["Bob"]);

    let late = Parameters {
        time_interval: graphbench::TimeInterval {
            start_year: 1970,
            end_year: 2010,
        },
        ..p
    };
    assert_eq!(run(&fx, q4(&late)).await, vec!["Cid"]);
}

#[tokio::test]
async fn test_q5_most_genres() {
    let fx = ImdbFixture::new().await;
    assert_eq!(run(&fx, q5(&fx.params())).await, vec!["Ann"]);
}

#[tokio::test]
async fn test_q6_q7_writer_collaborations() {
    let fx = ImdbFixture::new().await;
    let p = fx.params();
    // Ann reaches Wes through two titles but is listed once
    assert_eq!(run(&fx, q6(&p)).await, vec!["Ann", "Eve"]);
    assert_eq!(run(&fx, q7(&p)).await, vec!["Dan", "Nia"]);

    let wyn = Parameters {
        writer_id: fx.wyn.to_string(),
        ..p
    };
    assert_eq!(run(&fx, q6(&wyn)).await, vec!["Ann", "Eve", "Dan"]);
    assert_eq!(run(&fx, q7(&wyn)).await, vec!["Nia"]);
}

#[tokio::test]
async fn test_q8_writer_credit_threshold() {
    let fx = ImdbFixture::new().await;
    // Eve (0) and Wil (1) fall below the threshold; Wes (2) and Wyn (3) do not
    assert_eq!(run(&fx, q8(&fx.params())).await, vec!["Wes", "Wyn"]);
}

#[tokio::test]
async fn test_q9_credited_people() {
    let fx = ImdbFixture::new().await;
    let p = fx.params();
    assert_eq!(
        run(&fx, q9(&p)).await,
        vec!["Ann", "Eve", "Bob", "Wes", "Wyn"]
    );

    let gamma = Parameters {
        movie_id: fx.gamma.to_string(),
        ..p
    };
    assert_eq!(run(&fx, q9(&gamma)).await, vec!["Ann", "Cid", "Wil", "Wyn"]);
}

#[tokio::test]
async fn test_q10_q11_titles() {
    let fx = ImdbFixture::new().await;
    let p = fx.params();
    assert_eq!(run(&fx, q10(&p)).await, vec!["Alpha"]);
    assert_eq!(
        run(&fx, q11(&p)).await,
        vec!["Alpha", "Beta", "Delta", "Epsilon", "Gamma"]
    );
}

#[tokio::test]
async fn test_every_standard_query_matches_its_shape() {
    let fx = ImdbFixture::new().await;
    let p = fx.params();
    for def in WorkloadLibrary::standard().iter() {
        let values = fx.client.execute(&def.traversal(&p)).await.unwrap();
        if let Some(shape) = def.expected() {
            assert!(
                shape.check(values.len()).is_ok(),
                "{} returned {} values, expected {}",
                def.name(),
                values.len(),
                shape
            );
        }
    }
}

#[test]
fn test_single_shape_rejects_empty_results() {
    assert!(ResultShape::Single.check(0).is_err());
    assert!(ResultShape::Bounded(2).check(0).is_ok());
    assert!(ResultShape::Bounded(2).check(3).is_err());
}
