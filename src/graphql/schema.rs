use async_graphql::{EmptySubscription, Schema};

use crate::graphql::resolvers::{Mutation, Query};
use crate::services::{PgSettlementService, PgTransactionService};

pub type AppSchema = Schema<Query, Mutation, EmptySubscription>;

pub fn build_schema(settlement: PgSettlementService, transactions: PgTransactionService) -> AppSchema {
    Schema::build(Query::default(), Mutation::default(), EmptySubscription)
        .data(settlement)
        .data(transactions)
        .finish()
}
