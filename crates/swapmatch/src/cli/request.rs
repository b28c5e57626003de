use crate::cli::{
    open_engine, print_json, Cli, RequestCommands, RequestCreateArgs, RequestDeleteArgs,
    RequestFieldArgs, RequestShowArgs, RequestUpdateArgs,
};
use anyhow::Result;
use serde_json::json;
use swapmatch_core::{parse_request_id, RequestPayload};

pub fn run(cmd: &RequestCommands, cli: &Cli) -> Result<()> {
    match cmd {
        RequestCommands::Create(args) => create(args, cli),
        RequestCommands::Update(args) => update(args, cli),
        RequestCommands::Delete(args) => delete(args, cli),
        RequestCommands::Show(args) => show(args, cli),
    }
}

fn payload(fields: &RequestFieldArgs) -> RequestPayload {
    RequestPayload {
        held_resource: fields.held.clone(),
        held_resource_detail: fields.detail.clone(),
        first_choice: fields.first.clone(),
        second_choice: fields.second.clone(),
        third_choice: fields.third.clone(),
        desired_choice: fields.desired.clone(),
    }
}

fn create(args: &RequestCreateArgs, cli: &Cli) -> Result<()> {
    let engine = open_engine(cli)?;
    let id = engine.create_request(
        &args.actor.participant(),
        args.kind.into(),
        payload(&args.fields),
    )?;
    print_json(&json!({ "request_id": id }))
}

fn update(args: &RequestUpdateArgs, cli: &Cli) -> Result<()> {
    let engine = open_engine(cli)?;
    let id = parse_request_id(&args.id)?;
    let updated = engine.update_request(&args.actor.participant(), id, &payload(&args.fields))?;
    print_json(&json!({ "request_id": id, "updated": updated }))
}

fn delete(args: &RequestDeleteArgs, cli: &Cli) -> Result<()> {
    let engine = open_engine(cli)?;
    let id = parse_request_id(&args.id)?;
    engine.delete_request(&args.actor.participant(), id)?;
    print_json(&json!({ "request_id": id, "deleted": true }))
}

fn show(args: &RequestShowArgs, cli: &Cli) -> Result<()> {
    let engine = open_engine(cli)?;
    let own = engine.get_own_request(&args.actor.participant(), args.kind.into())?;
    print_json(&own)
}
