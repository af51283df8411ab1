use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::serde::json::Json;
use rocket::serde::Serialize;
use rocket::{get, options, post, Request, Response, State};

use crate::error::RequestResult;
use crate::leaderboard::{parse_limit, Leaderboard, RankedView};
use crate::ledger::{ScoreLedger, SubmitOutcome};
use crate::score::{ScoreRecord, ScoreSubmission};

#[derive(Serialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct SubmitResponse {
    pub outcome: SubmitOutcome,
}

/// Liveness probe. Never touches the store.
#[get("/healthcheck")]
pub fn healthcheck() -> &'static str {
    "OK"
}

/// Submits a score for a player; the stored score only changes if this one is better.
#[post("/updatescore", format = "json", data = "<submission>")]
pub async fn update_score(
    submission: Json<ScoreSubmission>,
    ledger: &State<ScoreLedger>,
) -> RequestResult<Json<SubmitResponse>> {
    let submission = submission.into_inner();
    let outcome = ledger.submit(&submission.user_name, submission.score).await?;
    Ok(Json(SubmitResponse { outcome }))
}

/// Fetches the top of the leaderboard, `limit` records at most.
#[get("/getall?<limit>")]
pub async fn get_all(
    limit: Option<&str>,
    view: &State<RankedView>,
) -> RequestResult<Json<Leaderboard<ScoreRecord>>> {
    let limit = limit.map(parse_limit).transpose()?;
    let leaderboard = view.top_scores(limit).await?;
    Ok(Json(leaderboard))
}

/// Answers CORS preflight requests for every path.
#[options("/<_..>")]
pub fn preflight() {}

/// Lets browsers on any origin talk to the server.
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Headers",
            "Origin, Content-Type, Accept",
        ));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, OPTIONS",
        ));
    }
}
