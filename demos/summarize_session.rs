//! Summarize a small tabular export and print the result as CSV

use retrieval_summary::{
    adapter_for, BehaviourSummarizer, EventLogAdapter, ExportFormat, SummaryTable,
};

fn main() {
    let export = "Observation id,Subject,Behavior,Behavioral category,Behavior type,Time\n\
dam-07,dam,pup intro,,POINT,12.0\n\
dam-07,dam,pup sniff,exploration,START,15.5\n\
dam-07,dam,pup sniff,exploration,STOP,19.0\n\
dam-07,dam,retrieval to nest,retrieval,START,31.0\n\
dam-07,dam,retrieval to nest,retrieval,STOP,36.5\n\
dam-07,dam,crouching,nest,START,40.0\n\
dam-07,dam,crouching,nest,STOP,160.0\n";

    let log = match adapter_for(ExportFormat::Tabular).parse(export) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("Error: {e}");
            return;
        }
    };

    let summarizer = BehaviourSummarizer::new();
    match summarizer.summarize(&log, "dam-07", "P5", "day", SummaryTable::new(), None) {
        Ok(table) => print!("{}", table.to_csv()),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
