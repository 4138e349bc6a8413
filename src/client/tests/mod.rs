#[cfg(test)]
mod command;
#[cfg(test)]
mod convert;
#[cfg(test)]
mod transaction;

use crate::argv::Command;
use crate::invoker::MockCommandExecutor;
use crate::reply::Reply;
use mockall::Sequence;

/// Expects the given command (in sequence) and answers with `reply`
pub(crate) fn expect(executor: &mut MockCommandExecutor, sequence: &mut Sequence, args: &'static [&'static str], reply: Reply) {
    executor
        .expect_execute()
        .times(1)
        .in_sequence(sequence)
        .withf(move |command: &Command| {
            command.len() == args.len()
                && command
                    .arguments()
                    .iter()
                    .zip(args)
                    .all(|(actual, expected)| actual.as_bytes() == expected.as_bytes())
        })
        .returning(move |_| Ok(reply.clone()));
}
