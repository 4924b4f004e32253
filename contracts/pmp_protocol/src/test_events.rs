extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events, Ledger as _},
    token, vec, Address, BytesN, Env, IntoVal, String, Symbol, TryIntoVal, Val,
};

use crate::events::{Executed, PayoutReleased, PledgeCreated, ProjectCreated};
use crate::{
    Payload, PerpetualMotionProtocol, PerpetualMotionProtocolClient, RoundUpCharge, Strategy,
    StrategyKind, StreamTerms,
};

fn setup() -> (Env, PerpetualMotionProtocolClient<'static>) {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register(PerpetualMotionProtocol, ());
    let client = PerpetualMotionProtocolClient::new(&env, &contract_id);
    (env, client)
}

fn create_token<'a>(env: &Env, admin: &Address) -> token::Client<'a> {
    let addr = env.register_stellar_asset_contract_v2(admin.clone());
    token::Client::new(env, &addr.address())
}

fn funded_pledger(env: &Env, token: &token::Client, protocol: &Address) -> Address {
    let pledger = Address::generate(env);
    token::StellarAssetClient::new(env, &token.address).mint(&pledger, &1_000_000);
    token.approve(&pledger, protocol, &1_000_000, &(env.ledger().sequence() + 1_000));
    pledger
}

/// Data of the most recent event published by `contract` under
/// `(topic, project_id)`.
fn last_event(env: &Env, contract: &Address, topic: Symbol, project_id: u64) -> Option<Val> {
    let expected_topics = vec![env, topic.into_val(env), project_id.into_val(env)];
    env.events()
        .all()
        .iter()
        .filter(|(source, topics, _)| source == contract && *topics == expected_topics)
        .last()
        .map(|(_, _, data)| data)
}

#[test]
fn test_project_created_event() {
    let (env, client) = setup();
    let token = create_token(&env, &Address::generate(&env));
    let recipient = Address::generate(&env);
    let name = String::from_str(&env, "ETH Global");
    let description = String::from_str(&env, "Hack-a-thon");

    let id = client.create_project(&name, &description, &recipient, &token.address, &100_000, &1_000);

    let data = last_event(&env, &client.address, symbol_short!("created"), id)
        .expect("created event missing");
    let event: ProjectCreated = data.try_into_val(&env).unwrap();
    assert_eq!(
        event,
        ProjectCreated {
            project_id: id,
            recipient,
            name,
            description,
            cap: 100_000,
        }
    );
}

#[test]
fn test_pledge_created_event() {
    let (env, client) = setup();
    let token = create_token(&env, &Address::generate(&env));
    let pledger = Address::generate(&env);
    let name = String::from_str(&env, "Doin' Good");
    let id = client.create_project(&name, &name, &Address::generate(&env), &token.address, &1_000_000, &1_000);

    client.pledge(
        &id,
        &pledger,
        &Strategy::Stream(StreamTerms {
            amount_per_period: 100_000,
            period_seconds: 100,
        }),
    );

    let data = last_event(&env, &client.address, symbol_short!("pledged"), id)
        .expect("pledged event missing");
    let event: PledgeCreated = data.try_into_val(&env).unwrap();
    assert_eq!(
        event,
        PledgeCreated {
            project_id: id,
            contributor: pledger,
            kind: StrategyKind::Stream,
            upfront: 0,
        }
    );
}

#[test]
fn test_executed_and_payout_events() {
    let (env, client) = setup();
    let token = create_token(&env, &Address::generate(&env));
    let recipient = Address::generate(&env);
    let name = String::from_str(&env, "Doin' Good");
    let id = client.create_project(&name, &name, &recipient, &token.address, &1_000_000, &1_000);

    let streamer = funded_pledger(&env, &token, &client.address);
    let rounder = funded_pledger(&env, &token, &client.address);
    let idle = Address::generate(&env);
    client.pledge(
        &id,
        &streamer,
        &Strategy::Stream(StreamTerms {
            amount_per_period: 100_000,
            period_seconds: 100,
        }),
    );
    client.pledge(&id, &rounder, &Strategy::RoundUp);

    env.ledger().with_mut(|li| li.timestamp += 900);
    let charge = Payload::RoundUp(RoundUpCharge {
        reference: BytesN::from_array(&env, &[0x48; 32]),
        amount: 100_000,
    });
    client.execute(
        &vec![&env, id],
        &vec![&env, vec![&env, idle, streamer.clone(), rounder.clone()]],
        &vec![&env, vec![&env, Payload::Empty, Payload::Empty, charge]],
    );

    let data = last_event(&env, &client.address, symbol_short!("executed"), id)
        .expect("executed event missing");
    let executed: Executed = data.try_into_val(&env).unwrap();
    assert_eq!(
        executed,
        Executed {
            project_id: id,
            contributors: vec![&env, streamer, rounder],
            amounts: vec![&env, 900_000i128, 100_000i128],
            total: 1_000_000,
        }
    );

    let data = last_event(&env, &client.address, symbol_short!("payout"), id)
        .expect("payout event missing");
    let payout: PayoutReleased = data.try_into_val(&env).unwrap();
    assert_eq!(
        payout,
        PayoutReleased {
            project_id: id,
            recipient,
            amount: 1_000_000,
        }
    );
}

#[test]
fn test_no_payout_event_below_cap() {
    let (env, client) = setup();
    let token = create_token(&env, &Address::generate(&env));
    let name = String::from_str(&env, "Doin' Good");
    let id = client.create_project(&name, &name, &Address::generate(&env), &token.address, &1_000_000, &1_000);
    let pledger = funded_pledger(&env, &token, &client.address);

    client.pledge(&id, &pledger, &Strategy::LumpSum(100_000));

    let data = last_event(&env, &client.address, symbol_short!("pledged"), id)
        .expect("pledged event missing");
    let event: PledgeCreated = data.try_into_val(&env).unwrap();
    assert_eq!(event.kind, StrategyKind::LumpSum);
    assert_eq!(event.upfront, 100_000);
    assert!(last_event(&env, &client.address, symbol_short!("payout"), id).is_none());
}
