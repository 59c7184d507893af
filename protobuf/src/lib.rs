tonic::include_proto!("speciesnet");
